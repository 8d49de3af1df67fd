//! Serialization back to XML bytes
//!
//! Iterative walk with an explicit stack so deep trees cannot overflow the
//! call stack. Content is written exactly as stored: text and attribute
//! values were never decoded, so they are not re-escaped either.
//!
//! Output is normalized: every element gets an explicit close tag and every
//! attribute value is double-quoted.

use super::node::{NodeData, NodeId, ROOT};
use super::store::DocumentStore;
use super::strings::StrId;

enum Step {
    Enter(NodeId),
    Close(NodeId),
}

/// Serialize the whole document
pub fn render(store: &DocumentStore) -> Vec<u8> {
    render_node(store, ROOT)
}

/// Serialize one node and its subtree; unknown ids render as nothing
pub fn render_node(store: &DocumentStore, id: NodeId) -> Vec<u8> {
    let mut out = Vec::with_capacity(store.strings().bytes_used() + 256);
    write_node(store, id, &mut out);
    out
}

/// Append the serialization of `id` to `out`
pub fn write_node(store: &DocumentStore, id: NodeId, out: &mut Vec<u8>) {
    let strings = store.strings();
    let text = move |s: StrId| strings.get(s).unwrap_or_default();

    let mut stack = Vec::with_capacity(64);
    stack.push(Step::Enter(id));

    while let Some(step) = stack.pop() {
        let current = match step {
            Step::Close(element) => {
                out.extend_from_slice(b"</");
                out.extend_from_slice(store.name(element).unwrap_or_default());
                out.push(b'>');
                continue;
            }
            Step::Enter(current) => current,
        };
        let Some(record) = store.get(current) else {
            continue;
        };

        match record.data {
            NodeData::Document { .. } => push_children(store, current, &mut stack),
            NodeData::Element { name, .. } => {
                out.push(b'<');
                out.extend_from_slice(text(name));
                for (attr_name, attr_value) in store.attribute_pairs(current) {
                    out.push(b' ');
                    out.extend_from_slice(attr_name);
                    out.extend_from_slice(b"=\"");
                    out.extend_from_slice(attr_value);
                    out.push(b'"');
                }
                out.push(b'>');
                stack.push(Step::Close(current));
                push_children(store, current, &mut stack);
            }
            NodeData::Attribute { name, value } => {
                out.extend_from_slice(text(name));
                out.extend_from_slice(b"=\"");
                out.extend_from_slice(text(value));
                out.push(b'"');
            }
            NodeData::Text(content) => out.extend_from_slice(text(content)),
            NodeData::CData(content) => {
                out.extend_from_slice(b"<![CDATA[");
                out.extend_from_slice(text(content));
                out.extend_from_slice(b"]]>");
            }
            NodeData::Comment(content) => {
                out.extend_from_slice(b"<!--");
                out.extend_from_slice(text(content));
                out.extend_from_slice(b"-->");
            }
            NodeData::ProcessingInstruction(content) => {
                out.extend_from_slice(b"<?");
                out.extend_from_slice(text(content));
                out.extend_from_slice(b"?>");
            }
        }
    }
}

/// Children are forward-linked only, so collect then push in reverse
fn push_children(store: &DocumentStore, parent: NodeId, stack: &mut Vec<Step>) {
    let start = stack.len();
    stack.extend(store.children(parent).map(Step::Enter));
    stack[start..].reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::dom::builder::parse;
    use crate::dom::Transaction;

    fn round_trip(input: &str) -> String {
        let store = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        String::from_utf8(render(&store)).unwrap()
    }

    #[test]
    fn test_canonical_input_round_trips() {
        let input = "<?xml version=\"1.0\"?><!-- c --><root a=\"1\" b=\"x&amp;y\">\n  \
                     <item>Hello &lt;world&gt;</item><![CDATA[<raw>]]><empty></empty>\n</root>";
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn test_self_closing_and_quotes_normalized() {
        assert_eq!(round_trip("<a/>"), "<a></a>");
        assert_eq!(round_trip("<a k='v' flag/>"), "<a k=\"v\" flag=\"\"></a>");
    }

    #[test]
    fn test_render_node_subtree() {
        let store = parse(b"<r><a x=\"1\">t</a><b/></r>", &ParseOptions::default()).unwrap();
        let r = store.root_element().unwrap();
        let a = store.first_child(r).unwrap();
        assert_eq!(render_node(&store, a), b"<a x=\"1\">t</a>");
        let attr = store.attribute_node(a, b"x").unwrap();
        assert_eq!(render_node(&store, attr), b"x=\"1\"");
        assert_eq!(render_node(&store, 999), b"");
    }

    #[test]
    fn test_render_after_transform() {
        let store = parse(b"<r><a/></r>", &ParseOptions::default()).unwrap();
        let r = store.root_element().unwrap();
        let mut tx = Transaction::new();
        let t = tx.create_text("hi");
        tx.prepend_child(r, t);
        tx.set_attribute(r, "v", "2");
        let next = store.transform(tx).unwrap();
        assert_eq!(render(&next), b"<r v=\"2\">hi<a></a></r>");
        assert_eq!(render(&store), b"<r><a></a></r>");
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let input = format!("{}{}", "<d>".repeat(depth), "</d>".repeat(depth));
        assert_eq!(round_trip(&input), input);
    }
}
