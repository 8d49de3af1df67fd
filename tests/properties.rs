//! End-to-end properties of parse, transform, query and render
//!
//! Each test drives the public API only.

use xmlarena::dom::{StringPool, Transaction};
use xmlarena::{
    parse, query, render, tokenize, DocumentStore, EntityKind, NodeId, NodeKind, ParseOptions, ROOT,
};

const CHILDREN: &[u8] = b"<root><child attr=\"a\">A</child><child attr=\"b\">B</child></root>";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn load(input: &[u8]) -> DocumentStore {
    parse(input, &ParseOptions::default()).unwrap()
}

/// Walk every child list and check it against its recorded count and tail
fn assert_lists_intact(store: &DocumentStore) {
    let mut pending = vec![ROOT];
    while let Some(id) = pending.pop() {
        let children: Vec<NodeId> = store.children(id).collect();
        assert_eq!(children.len(), store.child_count(id), "count of node {id}");
        assert_eq!(children.last().copied(), store.last_child(id), "tail of node {id}");
        for &child in &children {
            assert_eq!(store.parent_of(child), Some(id));
        }
        pending.extend(children);
    }
    assert!(store.is_consistent());
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn test_round_trip_well_formed() {
    init_tracing();
    let inputs: &[&str] = &[
        "<root></root>",
        "<root><child attr=\"a\">A</child><child attr=\"b\">B</child></root>",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<doc>\n  <p class=\"x\">a &amp; b</p>\n</doc>\n",
        "<a><!-- note --><![CDATA[if (a < b) {}]]><?pi data?></a>",
        "<ünïcødé attr=\"välue\">テキスト</ünïcødé>",
        "leading text<a></a>trailing text",
    ];
    for input in inputs {
        let store = load(input.as_bytes());
        assert_eq!(
            String::from_utf8(render(&store)).unwrap(),
            *input,
            "round trip of {input:?}"
        );
    }
}

#[test]
fn test_round_trip_survives_transform_of_other_version() {
    let v1 = load(CHILDREN);
    let root = v1.root_element().unwrap();
    let mut tx = Transaction::new();
    tx.set_attribute(root, "added", "yes");
    let _v2 = v1.transform(tx).unwrap();
    assert_eq!(render(&v1), CHILDREN);
}

// ============================================================================
// INTERNING
// ============================================================================

#[test]
fn test_interning_is_idempotent() {
    let mut pool = StringPool::new();
    for s in ["root", "child", "", "a longer value with spaces", "root"] {
        let first = pool.intern(s.as_bytes());
        let second = pool.intern(s.as_bytes());
        assert_eq!(first, second);
        assert_eq!(pool.get(first), Some(s.as_bytes()));
    }
}

#[test]
fn test_repeated_names_share_ids() {
    let store = load(CHILDREN);
    let ids: Vec<_> = query(&store, ROOT, "/root/child")
        .unwrap()
        .into_iter()
        .map(|id| store.name_id(id))
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], ids[1]);
}

// ============================================================================
// VERSION ISOLATION
// ============================================================================

#[test]
fn test_later_transforms_never_change_earlier_answers() {
    let d1 = load(CHILDREN);
    let before = query(&d1, ROOT, "/root/child").unwrap();
    let root = d1.root_element().unwrap();

    let mut tx = Transaction::new();
    let extra = tx.create_element("child");
    tx.append_child(root, extra);
    let d2 = d1.transform(tx).unwrap();

    let mut tx = Transaction::new();
    tx.remove_child(root, before[0]);
    tx.set_attribute(before[1], "attr", "changed");
    let d3 = d2.transform(tx).unwrap();

    assert_eq!(query(&d1, ROOT, "/root/child").unwrap(), before);
    assert_eq!(d1.attribute(before[1], b"attr"), Some(b"b" as &[u8]));
    assert_eq!(query(&d2, ROOT, "/root/child").unwrap().len(), 3);
    assert_eq!(query(&d3, ROOT, "/root/child").unwrap().len(), 2);
    assert_eq!(query(&d3, ROOT, "/root/child[@attr='changed']").unwrap().len(), 1);
    assert_eq!((d1.version(), d2.version(), d3.version()), (1, 2, 3));
}

#[test]
fn test_replay_rebuilds_version() {
    let d1 = load(CHILDREN);
    let root = d1.root_element().unwrap();
    let mut tx = Transaction::new();
    let note = tx.create_comment(" appended ");
    tx.prepend_child(root, note);
    let d2 = d1.transform(tx).unwrap();

    let rebuilt = d2.replay().unwrap();
    assert_eq!(render(&rebuilt), render(&d2));
    assert_eq!(rebuilt.node_count(), d2.node_count());
}

// ============================================================================
// STRUCTURAL INTEGRITY
// ============================================================================

#[test]
fn test_lists_intact_after_edit_sequence() {
    let mut store = load(b"<r><a/><b/><c/></r>");
    let r = store.root_element().unwrap();
    assert_lists_intact(&store);

    let [a, b, c]: [NodeId; 3] = store.children(r).collect::<Vec<_>>().try_into().unwrap();

    let steps: Vec<Box<dyn Fn(&mut Transaction)>> = vec![
        Box::new(move |tx: &mut Transaction| tx.remove_child(r, b)),
        Box::new(move |tx: &mut Transaction| tx.prepend_child(r, b)),
        Box::new(move |tx: &mut Transaction| tx.remove_child(r, c)),
        Box::new(move |tx: &mut Transaction| tx.append_child(a, c)),
        Box::new(move |tx: &mut Transaction| tx.remove_child(r, a)),
        Box::new(move |tx: &mut Transaction| tx.remove_child(r, b)),
        Box::new(move |tx: &mut Transaction| tx.append_child(r, a)),
        Box::new(move |tx: &mut Transaction| {
            let t = tx.create_text("tail");
            tx.append_child(r, t);
        }),
    ];
    for step in steps {
        let mut tx = Transaction::new();
        step(&mut tx);
        store = store.transform(tx).unwrap();
        assert_lists_intact(&store);
    }
    assert_eq!(render(&store), b"<r><a><c></c></a>tail</r>");
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_query_predicate_selects_single_child() {
    let store = load(CHILDREN);
    let hits = query(&store, ROOT, "/root/child[@attr=\"a\"]").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(store.kind(hits[0]), Some(NodeKind::Element));
    assert_eq!(store.name(hits[0]), Some(b"child" as &[u8]));
    assert_eq!(store.attribute(hits[0], b"attr"), Some(b"a" as &[u8]));
}

#[test]
fn test_query_children_in_document_order() {
    let store = load(CHILDREN);
    let hits = query(&store, ROOT, "/root/child").unwrap();
    let values: Vec<_> = hits.iter().map(|&id| store.attribute(id, b"attr").unwrap()).collect();
    assert_eq!(values, vec![b"a" as &[u8], b"b"]);
}

#[test]
fn test_query_missing_name_is_empty() {
    let store = load(CHILDREN);
    assert_eq!(query(&store, ROOT, "/root/nonexistent"), Ok(vec![]));
}

#[test]
fn test_query_empty_root() {
    let store = load(b"<root></root>");
    assert_eq!(query(&store, ROOT, "/root/child"), Ok(vec![]));
}

// ============================================================================
// ATTRIBUTES AND TOKENS
// ============================================================================

#[test]
fn test_set_attribute_twice_leaves_one_node() {
    let store = load(b"<e/>");
    let e = store.root_element().unwrap();
    let mut tx = Transaction::new();
    tx.set_attribute(e, "k", "first");
    tx.set_attribute(e, "k", "second");
    let store = store.transform(tx).unwrap();

    let attrs: Vec<_> = store.attributes(e).collect();
    assert_eq!(attrs.len(), 1);
    assert_eq!(store.value(attrs[0]), Some(b"second" as &[u8]));
}

#[test]
fn test_self_closing_tokenizes_open_then_close() {
    let entities = tokenize(b"<a/>").unwrap();
    assert_eq!(entities.len(), 2);
    match &entities[0].kind {
        EntityKind::Open {
            name, self_closing, ..
        } => {
            assert_eq!(name.slice(b"<a/>"), b"a");
            assert!(*self_closing);
        }
        other => panic!("expected Open, got {other:?}"),
    }
    match &entities[1].kind {
        EntityKind::Close { name, synthesized } => {
            assert_eq!(name.slice(b"<a/>"), b"a");
            assert!(*synthesized);
        }
        other => panic!("expected Close, got {other:?}"),
    }
}
