//! Session lifecycle, staging and commit semantics

#[path = "testutils/mod.rs"]
mod testutils;

use graphkv::{Document, GraphError, Node};
use testutils::graph_fixture::GraphFixture;

fn person(name: &str, age: i64) -> Document {
    Document::object([("name", Document::from(name)), ("age", Document::from(age))])
}

#[test]
fn test_node_round_trip_in_new_session() {
    for fixture in [GraphFixture::memory(), GraphFixture::sled()] {
        let fixture = fixture.expect("Failed to create fixture");
        let doc = person("Ada", 36);

        let mut writer = fixture.session();
        let created = writer.create_node(doc.clone()).unwrap();
        writer.save_changes().unwrap();
        writer.dispose();

        let mut reader = fixture.session();
        let loaded = reader.load_node(created.id).unwrap().expect("node not found");
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.properties, doc);
        assert_eq!(loaded.get_property("name").and_then(Document::as_string), Some("Ada"));
        reader.dispose();
    }
}

#[test]
fn test_missing_node_is_none() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    assert_eq!(session.load_node(42).unwrap(), None);
    assert_eq!(session.load_edge(1, 0, 2).unwrap(), None);
    session.dispose();
}

#[test]
fn test_empty_and_null_documents_round_trip() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut writer = fixture.session();
    let empty = writer.create_node(Document::empty()).unwrap();
    let null = writer.create_node(Document::Null).unwrap();
    writer.save_changes().unwrap();
    writer.dispose();

    let mut reader = fixture.session();
    assert_eq!(reader.load_node(empty.id).unwrap().unwrap().properties, Document::empty());
    assert_eq!(reader.load_node(null.id).unwrap().unwrap().properties, Document::Null);
    reader.dispose();
}

#[test]
fn test_recreated_edge_overwrites() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let a = session.create_node(Document::empty()).unwrap();
    let b = session.create_node(Document::empty()).unwrap();
    session
        .create_edge_between(&a, &b, Document::object([("v", 1i64)]), 1)
        .unwrap();
    session
        .create_edge_between(&a, &b, Document::object([("v", 2i64)]), 1)
        .unwrap();
    session.save_changes().unwrap();
    session.dispose();

    let mut reader = fixture.session();
    let edges: Vec<_> = reader
        .get_edges_between(&a, &b)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge_type, 1);
    assert_eq!(edges[0].get_property("v"), Some(&Document::from(2i64)));
    assert_eq!(reader.iterate_edges().unwrap().count(), 1);
    reader.dispose();
}

#[test]
fn test_is_isolated_lifecycle() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");

    let mut session = fixture.session();
    let a = session.create_node(Document::empty()).unwrap();
    let b = session.create_node(Document::empty()).unwrap();
    assert!(session.is_isolated(&a).unwrap(), "isolated before commit");
    session.save_changes().unwrap();
    session.dispose();

    let mut fresh = fixture.session();
    assert!(fresh.is_isolated(&a).unwrap(), "isolated after commit");
    fresh.create_edge(&a, &b).unwrap();
    assert!(!fresh.is_isolated(&a).unwrap(), "staged edge counts");
    assert!(fresh.is_isolated(&b).unwrap(), "incoming edges do not count");
    fresh.save_changes().unwrap();
    fresh.dispose();

    let mut after = fixture.session();
    assert!(!after.is_isolated(&a).unwrap());
    assert!(after.is_isolated(&b).unwrap());
    after.dispose();
}

#[test]
fn test_save_does_not_refresh_snapshot() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let node = session.create_node(Document::empty()).unwrap();
    assert!(session.load_node(node.id).unwrap().is_some());

    session.save_changes().unwrap();
    assert!(!session.has_pending_changes().unwrap());
    // own commit is not visible through the original snapshot
    assert!(session.load_node(node.id).unwrap().is_none());
    session.dispose();

    let mut fresh = fixture.session();
    assert!(fresh.load_node(node.id).unwrap().is_some());
    fresh.dispose();
}

#[test]
fn test_save_with_nothing_staged_is_a_no_op() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let version = fixture.store.version();
    let mut session = fixture.session();
    session.save_changes().unwrap();
    assert_eq!(fixture.store.version(), version);
    session.dispose();
}

#[test]
fn test_discard_changes() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let node = session.create_node(Document::empty()).unwrap();
    assert_eq!(session.pending_count().unwrap(), 2);

    session.discard_changes().unwrap();
    assert!(!session.has_pending_changes().unwrap());
    assert!(session.load_node(node.id).unwrap().is_none());
    session.save_changes().unwrap();
    session.dispose();

    let mut fresh = fixture.session();
    assert_eq!(fresh.iterate_nodes().unwrap().count(), 0);
    fresh.dispose();
}

#[test]
fn test_double_dispose_and_closed_session() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let node = session.create_node(Document::empty()).unwrap();
    let edge = session.create_edge(&node, &node).unwrap();

    session.dispose();
    session.dispose();
    assert!(session.is_disposed());
    assert!(fixture.store.open_snapshots().is_empty());

    let closed = |r: Result<(), GraphError>| matches!(r, Err(GraphError::SessionClosed));
    assert!(closed(session.iterate_nodes().map(|_| ())));
    assert!(closed(session.iterate_edges().map(|_| ())));
    assert!(closed(session.iterate_disconnected().map(|_| ())));
    assert!(closed(session.create_node(Document::empty()).map(|_| ())));
    assert!(closed(session.create_edge(&node, &node).map(|_| ())));
    assert!(closed(session.delete_node(&node)));
    assert!(closed(session.delete_edge(&edge)));
    assert!(closed(session.get_adjacent_of(&node, 0).map(|_| ())));
    assert!(closed(session.get_edges_between(&node, &node).map(|_| ())));
    assert!(closed(session.is_isolated(&node).map(|_| ())));
    assert!(closed(session.load_node(node.id).map(|_| ())));
    assert!(closed(session.save_changes()));
    assert!(closed(session.discard_changes()));
    assert!(closed(session.pending_count().map(|_| ())));
}

#[test]
fn test_disconnected_markers_are_not_restored() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let a = session.create_node(Document::empty()).unwrap();
    let b = session.create_node(Document::empty()).unwrap();
    let c = session.create_node(Document::empty()).unwrap();
    let edge = session.create_edge(&a, &b).unwrap();
    session.save_changes().unwrap();
    session.dispose();

    let disconnected = |fixture: &GraphFixture| {
        let mut session = fixture.session();
        let ids: Vec<u64> = session
            .iterate_disconnected()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        session.dispose();
        ids
    };
    assert_eq!(disconnected(&fixture), vec![b.id, c.id]);

    let mut session = fixture.session();
    session.delete_edge(&edge).unwrap();
    session.delete_node(&c).unwrap();
    session.save_changes().unwrap();
    session.dispose();

    // a lost its only edge but keeps no marker; is_isolated is authoritative
    assert_eq!(disconnected(&fixture), vec![b.id]);
    let mut session = fixture.session();
    assert!(session.is_isolated(&a).unwrap());
    session.dispose();
}

#[test]
fn test_node_delete_keeps_orphan_edges() {
    let fixture = GraphFixture::memory().expect("Failed to create fixture");
    let mut session = fixture.session();
    let a = session.create_node(Document::empty()).unwrap();
    let b = session.create_node(Document::empty()).unwrap();
    session.create_edge_between(&a, &b, Document::empty(), 3).unwrap();
    session.save_changes().unwrap();
    session.dispose();

    let mut session = fixture.session();
    session.delete_node(&b).unwrap();
    session.delete_node(&a).unwrap();
    session.save_changes().unwrap();
    session.dispose();

    let mut session = fixture.session();
    assert_eq!(session.iterate_nodes().unwrap().count(), 0);
    let orphan = session.load_edge(a.id, 3, b.id).unwrap().expect("edge removed");
    assert_eq!(orphan.key(), graphkv::EdgeKey::new(a.id, 3, b.id));
    assert!(!session.is_isolated(&a).unwrap());
    // adjacency skips targets without a node entry
    assert_eq!(session.get_adjacent_of(&a, 3).unwrap().count(), 0);
    session.dispose();
}

#[test]
fn test_iterate_nodes_merges_staged_and_stored() {
    let fixture = GraphFixture::chunked(2).expect("Failed to create fixture");
    let stored = fixture.committed_nodes(5).unwrap();

    let mut session = fixture.session();
    session.delete_node(&stored[1]).unwrap();
    session.delete_node(&stored[3]).unwrap();
    let extra = session.create_node(Document::from(true)).unwrap();

    let nodes: Vec<Node> = session
        .iterate_nodes()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let ids: Vec<u64> = nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![stored[0].id, stored[2].id, stored[4].id, extra.id]);
    assert_eq!(nodes[3].properties, Document::from(true));
    assert_eq!(nodes[1], stored[2]);
    session.dispose();
}
