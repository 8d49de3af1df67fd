//! Edge case and stress tests
//!
//! Malformed input, resource limits, error codes and large documents.

use xmlarena::dom::Transaction;
use xmlarena::{
    parse, query, render, tokenize, Document, Error, Limits, NodeKind, ParseOptions, QueryCache,
    StoreError, TokenizeError, WhitespaceMode, XPathError, ROOT,
};

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_empty_input() {
    let store = parse(b"", &ParseOptions::default()).unwrap();
    assert_eq!(store.child_count(ROOT), 0);
    assert!(store.root_element().is_none());
    assert_eq!(render(&store), b"");
}

#[test]
fn test_truncated_input_keeps_prefix() {
    let store = parse(b"<a><b>text</b><c attr=\"unterminated", &ParseOptions::default()).unwrap();
    let a = store.root_element().unwrap();
    assert_eq!(store.child_count(a), 1);
    assert_eq!(render(&store), b"<a><b>text</b></a>");
}

#[test]
fn test_unterminated_comment_stops_emission() {
    let entities = tokenize(b"<a>x<!-- never closed <b/>").unwrap();
    assert_eq!(entities.len(), 2);
    assert!(entities.iter().all(|e| !matches!(e.kind, xmlarena::EntityKind::Comment { .. })));
}

#[test]
fn test_mismatched_close_pops_anyway() {
    let store = parse(b"<a><b></a><c/>", &ParseOptions::default()).unwrap();
    // </a> closes <b>; <c/> lands inside <a>
    let a = store.root_element().unwrap();
    let names: Vec<_> = store.children(a).filter_map(|id| store.name(id)).collect();
    assert_eq!(names, vec![b"b" as &[u8], b"c"]);
}

#[test]
fn test_doctype_is_an_open_tag() {
    let store = parse(b"<!DOCTYPE note><note/>", &ParseOptions::default()).unwrap();
    let first = store.first_child(ROOT).unwrap();
    assert_eq!(store.kind(first), Some(NodeKind::Element));
    assert_eq!(store.name(first), Some(b"!DOCTYPE" as &[u8]));
}

// ============================================================================
// OPTIONS AND LIMITS
// ============================================================================

#[test]
fn test_whitespace_ignore_keeps_mixed_text() {
    let options = ParseOptions::new().whitespace(WhitespaceMode::Ignore);
    let store = parse(b"<p>\n  <b>x</b> and <i>y</i>\n</p>", &options).unwrap();
    let p = store.root_element().unwrap();
    let kinds: Vec<_> = store.children(p).filter_map(|id| store.kind(id)).collect();
    assert_eq!(kinds, vec![NodeKind::Element, NodeKind::Text, NodeKind::Element]);
}

#[test]
fn test_attribute_limit_reports_position_and_code() {
    let options = ParseOptions::new().limits(Limits::default().with_max_attributes(2));
    let err = parse(b"<ok a=\"1\"/><bad a=\"1\" b=\"2\" c=\"3\"/>", &options).unwrap_err();
    assert_eq!(
        err,
        Error::Tokenize(TokenizeError::AttributeOverflow {
            position: 11,
            limit: 2
        })
    );
    assert_eq!(err.code(), 100);
}

#[test]
fn test_node_limit() {
    let options = ParseOptions::new().limits(Limits::default().with_max_nodes(4));
    assert!(parse(b"<a><b/><c/></a>", &options).is_ok());
    let err = parse(b"<a><b/><c/><d/></a>", &options).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::CapacityExceeded { limit: 4 })));
}

// ============================================================================
// STORE PRECONDITIONS
// ============================================================================

#[test]
fn test_store_errors_have_codes() {
    let store = parse(b"<r>t</r>", &ParseOptions::default()).unwrap();
    let r = store.root_element().unwrap();
    let text = store.first_child(r).unwrap();

    let mut tx = Transaction::new();
    tx.set_attribute(text, "k", "v");
    let err = store.transform(tx).unwrap_err();
    assert_eq!(err, StoreError::NotElement(text));
    assert_eq!(Error::from(err).code(), 203);

    let mut tx = Transaction::new();
    tx.remove_child(ROOT, text);
    let err = store.transform(tx).unwrap_err();
    assert_eq!(err, StoreError::ChildNotFound { parent: ROOT, child: text });
}

#[test]
fn test_remove_absent_attribute_is_noop() {
    let store = parse(b"<r k=\"v\"/>", &ParseOptions::default()).unwrap();
    let r = store.root_element().unwrap();
    let mut tx = Transaction::new();
    tx.remove_attribute(r, "missing");
    let next = store.transform(tx).unwrap();
    assert_eq!(render(&next), b"<r k=\"v\"></r>");
    assert_eq!(next.version(), 2);
}

// ============================================================================
// XPATH
// ============================================================================

#[test]
fn test_parse_errors_are_distinct_from_empty_results() {
    let store = parse(b"<r/>", &ParseOptions::default()).unwrap();
    assert_eq!(query(&store, ROOT, "/nothing"), Ok(vec![]));
    assert_eq!(
        query(&store, ROOT, "/r[@a=b]"),
        Err(XPathError::ExpectedStringLiteral { position: 6 })
    );
}

#[test]
fn test_cache_shared_across_documents() {
    let cache = QueryCache::new();
    let one = Document::parse(b"<r><x/></r>").unwrap();
    let two = Document::parse(b"<r><x/><x/></r>").unwrap();
    assert_eq!(one.query_cached(&cache, "/r/x").unwrap().len(), 1);
    assert_eq!(two.query_cached(&cache, "/r/x").unwrap().len(), 2);
    assert_eq!(cache.stats().hits, 1);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let doc = Document::parse(b"<r><a k=\"1\"/><a k=\"2\"/><b/></r>").unwrap();
    let exprs = ["/r/a", "/r/a[@k='2']", "/r/b", "/r/c"];
    let parallel = xmlarena::evaluate_many(doc.store(), ROOT, &exprs);
    for (expr, result) in exprs.iter().zip(parallel) {
        assert_eq!(result, query(doc.store(), ROOT, expr));
    }
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_wide_document() {
    let mut input = String::from("<items>");
    for i in 0..5_000 {
        input.push_str(&format!("<item id=\"{i}\">v{i}</item>"));
    }
    input.push_str("</items>");

    let doc = Document::parse(input.as_bytes()).unwrap();
    assert_eq!(doc.query("/items/item").unwrap().len(), 5_000);
    let hit = doc.query("/items/item[@id='4321']").unwrap();
    assert_eq!(hit.len(), 1);
    assert_eq!(doc.text(hit[0]), "v4321");
    assert_eq!(doc.render(), input.as_bytes());
}
