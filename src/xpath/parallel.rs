//! Parallel XPath Evaluation
//!
//! Uses Rayon to run many queries over one store version at once. A version
//! is never written after `transform` returns, so it is shared by reference
//! across worker threads without locking.

use rayon::prelude::*;

use super::eval::{evaluate, query};
use super::parser::Path;
use crate::dom::{DocumentStore, NodeId};
use crate::error::XPathError;

/// Evaluate multiple expressions in parallel; results keep input order
pub fn evaluate_many(
    store: &DocumentStore,
    context: NodeId,
    exprs: &[&str],
) -> Vec<Result<Vec<NodeId>, XPathError>> {
    exprs
        .par_iter()
        .map(|expr| query(store, context, expr))
        .collect()
}

/// Evaluate already-parsed paths in parallel
pub fn evaluate_paths(store: &DocumentStore, context: NodeId, paths: &[Path]) -> Vec<Vec<NodeId>> {
    paths
        .par_iter()
        .map(|path| evaluate(store, context, path))
        .collect()
}

/// Evaluate one expression and map every matched node in parallel
pub fn query_map<F, T>(
    store: &DocumentStore,
    context: NodeId,
    expr: &str,
    mapper: F,
) -> Result<Vec<T>, XPathError>
where
    F: Fn(&DocumentStore, NodeId) -> T + Sync + Send,
    T: Send,
{
    let nodes = query(store, context, expr)?;
    Ok(nodes.par_iter().map(|&id| mapper(store, id)).collect())
}

/// Evaluate keyed expressions in parallel; the first parse error wins
pub fn xmap(
    store: &DocumentStore,
    context: NodeId,
    queries: &[(&str, &str)], // (key, xpath)
) -> Result<Vec<(String, Vec<NodeId>)>, XPathError> {
    queries
        .par_iter()
        .map(|(key, expr)| query(store, context, expr).map(|nodes| (key.to_string(), nodes)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::dom::{parse, ROOT};
    use crate::xpath::parser;

    fn load() -> DocumentStore {
        parse(b"<root><a/><b>x</b><b>y</b><c/></root>", &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_evaluate_many() {
        let store = load();
        let results = evaluate_many(&store, ROOT, &["/root/a", "/root/b", "root", "/root/z"]);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().map(Vec::len), Ok(1));
        assert_eq!(results[1].as_ref().map(Vec::len), Ok(2));
        assert!(results[2].is_err());
        assert_eq!(results[3].as_ref().map(Vec::len), Ok(0));
    }

    #[test]
    fn test_evaluate_paths() {
        let store = load();
        let paths = vec![parser::parse("/root/c").unwrap(), parser::parse("/root/b").unwrap()];
        let results = evaluate_paths(&store, ROOT, &paths);
        assert_eq!(results.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_query_map() {
        let store = load();
        let texts = query_map(&store, ROOT, "/root/b", |s, id| s.text_content(id)).unwrap();
        assert_eq!(texts, vec![b"x".to_vec(), b"y".to_vec()]);
    }

    #[test]
    fn test_xmap() {
        let store = load();
        let results = xmap(&store, ROOT, &[("first", "/root/a"), ("second", "/root/b")]).unwrap();
        assert_eq!(results[0].0, "first");
        assert_eq!(results[1].1.len(), 2);

        let err = xmap(&store, ROOT, &[("ok", "/root/a"), ("bad", "/root[")]).unwrap_err();
        assert_eq!(err, XPathError::ExpectedAt { position: 6 });
    }
}
