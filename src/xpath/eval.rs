//! XPath Evaluation Engine
//!
//! Walks a parsed path over one store version. Names in the path are
//! resolved to interned ids once; a name that was never interned cannot
//! match anything, so the result is empty without touching the tree.
//!
//! Each step matches Element children of the nodes reached by the previous
//! step. Nodes are visited parent by parent in sibling order, so the result
//! comes out in document order. Evaluation never fails.

use tracing::debug;

use super::parser::{self, Path};
use crate::dom::{DocumentStore, NodeData, NodeId, NodeKind, StrId, StringPool};
use crate::error::XPathError;

/// A step with its names resolved against one string pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedStep {
    name: StrId,
    /// (attribute name, expected value)
    predicate: Option<(StrId, StrId)>,
}

/// None if some name or literal in the path was never interned
fn resolve(strings: &StringPool, path: &Path) -> Option<Vec<ResolvedStep>> {
    path.steps()
        .map(|step| {
            let name = strings.lookup(step.name.as_bytes())?;
            let predicate = match &step.predicate {
                Some(pred) => Some((
                    strings.lookup(pred.attribute.as_bytes())?,
                    strings.lookup(pred.value.as_bytes())?,
                )),
                None => None,
            };
            Some(ResolvedStep { name, predicate })
        })
        .collect()
}

/// True if `id` is an Element named by `step` whose predicate holds
fn step_matches(store: &DocumentStore, id: NodeId, step: &ResolvedStep) -> bool {
    let Some(record) = store.get(id) else {
        return false;
    };
    match record.data {
        NodeData::Element { name, .. } if name == step.name => {}
        _ => return false,
    }
    let Some((attr_name, attr_value)) = step.predicate else {
        return true;
    };
    store.attributes(id).any(|attr| {
        matches!(
            store.get(attr).map(|r| r.data),
            Some(NodeData::Attribute { name, value }) if name == attr_name && value == attr_value
        )
    })
}

/// Evaluate `path` from `context`, a Document or Element node.
///
/// The first step is matched against the context's children. Any other
/// context kind, or an unknown id, yields an empty result.
pub fn evaluate(store: &DocumentStore, context: NodeId, path: &Path) -> Vec<NodeId> {
    match store.kind(context) {
        Some(NodeKind::Document | NodeKind::Element) => {}
        _ => return Vec::new(),
    }
    let Some(steps) = resolve(store.strings(), path) else {
        debug!(path = %path, "path names not present in document");
        return Vec::new();
    };

    let mut frontier = vec![context];
    for step in &steps {
        let mut next = Vec::new();
        for &node in &frontier {
            next.extend(store.children(node).filter(|&child| step_matches(store, child, step)));
        }
        if next.is_empty() {
            return next;
        }
        frontier = next;
    }

    debug!(path = %path, context, matched = frontier.len(), "evaluated path");
    frontier
}

/// Parse `expr` and evaluate it from `context`
///
/// Only parsing can fail; a path that matches nothing is an empty result.
pub fn query(store: &DocumentStore, context: NodeId, expr: &str) -> Result<Vec<NodeId>, XPathError> {
    let path = parser::parse(expr)?;
    Ok(evaluate(store, context, &path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::dom::{parse, Transaction, ROOT};

    const DOC: &[u8] = b"<root><child attr=\"a\">A</child><child attr=\"b\">B</child></root>";

    fn load(input: &[u8]) -> DocumentStore {
        parse(input, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_predicate_selects_one() {
        let store = load(DOC);
        let result = query(&store, ROOT, "/root/child[@attr=\"a\"]").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(store.name(result[0]), Some(b"child" as &[u8]));
        assert_eq!(store.attribute(result[0], b"attr"), Some(b"a" as &[u8]));
    }

    #[test]
    fn test_document_order() {
        let store = load(DOC);
        let result = query(&store, ROOT, "/root/child").unwrap();
        let attrs: Vec<_> = result.iter().map(|&id| store.attribute(id, b"attr")).collect();
        assert_eq!(attrs, vec![Some(b"a" as &[u8]), Some(b"b" as &[u8])]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let store = load(DOC);
        assert!(query(&store, ROOT, "/root/nonexistent").unwrap().is_empty());
        assert!(query(&store, ROOT, "/root/child[@attr='z']").unwrap().is_empty());
        assert!(query(&store, ROOT, "/root/child[@other='a']").unwrap().is_empty());
        assert!(query(&store, ROOT, "/child").unwrap().is_empty());

        let empty = load(b"<root></root>");
        assert!(query(&empty, ROOT, "/root/child").unwrap().is_empty());
    }

    #[test]
    fn test_element_context() {
        let store = load(b"<r><a><b>1</b></a><a><b>2</b><b>3</b></a></r>");
        let r = store.root_element().unwrap();
        let from_r = query(&store, r, "/a/b").unwrap();
        assert_eq!(from_r.len(), 3);
        let texts: Vec<Vec<u8>> = from_r.iter().map(|&id| store.text_content(id)).collect();
        assert_eq!(texts, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);

        let second_a = store.last_child(r).unwrap();
        assert_eq!(query(&store, second_a, "/b").unwrap().len(), 2);
    }

    #[test]
    fn test_non_element_context_is_empty() {
        let store = load(b"<r>text</r>");
        let r = store.root_element().unwrap();
        let text = store.first_child(r).unwrap();
        assert!(query(&store, text, "/r").unwrap().is_empty());
        assert!(query(&store, 999, "/r").unwrap().is_empty());
    }

    #[test]
    fn test_text_and_comments_never_match() {
        let store = load(b"<r><!--b--><b/>b</r>");
        assert_eq!(query(&store, ROOT, "/r/b").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_error_propagates() {
        let store = load(DOC);
        let err = query(&store, ROOT, "root").unwrap_err();
        assert_eq!(err, XPathError::ExpectedSlash { position: 0 });
    }

    #[test]
    fn test_versions_answer_independently() {
        let v1 = load(DOC);
        let root = v1.root_element().unwrap();
        let mut tx = Transaction::new();
        let extra = tx.create_element("child");
        tx.set_attribute(extra, "attr", "a");
        tx.append_child(root, extra);
        let v2 = v1.transform(tx).unwrap();

        assert_eq!(query(&v1, ROOT, "/root/child[@attr='a']").unwrap().len(), 1);
        assert_eq!(query(&v2, ROOT, "/root/child[@attr='a']").unwrap().len(), 2);
    }
}
