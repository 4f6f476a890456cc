//! End-to-end editing scenarios driven through the public model API.

use float_cmp::assert_approx_eq;

use fsmdraw::{
    geometry::Point,
    model::{Diagram, Link, Selection},
    record::{DiagramRecord, LinkRecord},
};

/// Two states joined by a link bent towards (150, 90), the first initial and
/// the second accepting.
fn two_state_machine() -> Diagram {
    let mut diagram = Diagram::new();
    diagram.create_node(Point::new(50.0, 50.0));
    diagram.set_text("A");
    diagram.create_node(Point::new(250.0, 50.0));
    diagram.set_text("B");

    assert!(diagram.begin_link(Point::new(50.0, 50.0)));
    diagram.update_link(Point::new(250.0, 50.0));
    assert!(diagram.commit_link(), "Link between two states should commit");
    diagram.set_text("a");

    assert!(diagram.begin_move(Point::new(150.0, 50.0)));
    diagram.move_selection(Point::new(150.0, 90.0));
    diagram.end_move();

    assert!(matches!(
        diagram.select_at(Point::new(50.0, 50.0)),
        Some(Selection::Node(_))
    ));
    assert!(diagram.toggle_initial());
    diagram.select_at(Point::new(250.0, 50.0));
    assert!(diagram.toggle_accept());

    diagram
}

#[test]
fn test_edit_snapshot_restore() {
    let diagram = two_state_machine();

    let record = diagram.snapshot();
    let json = record.to_json().expect("Failed to serialize record");

    let mut restored = Diagram::new();
    restored.restore(&DiagramRecord::from_json(&json).expect("Failed to parse record"));

    assert_eq!(restored.nodes().len(), 2);
    let a = &restored.nodes()[0];
    let b = &restored.nodes()[1];
    assert_eq!(a.text(), "A");
    assert!(a.is_initial());
    assert!(!a.is_accept_state());
    assert_eq!(b.text(), "B");
    assert!(b.is_accept_state());
    assert!(!b.is_initial());

    assert_eq!(restored.links().len(), 1);
    let Link::Plain(link) = &restored.links()[0] else {
        panic!("Expected a plain link, got {:?}", restored.links()[0]);
    };
    assert_eq!(link.node_a(), a.id());
    assert_eq!(link.node_b(), b.id());
    assert_eq!(link.text(), "a");
    assert_approx_eq!(f64, link.parallel_part(), 0.5);
    assert_approx_eq!(f64, link.perpendicular_part(), 30.0);

    assert!(restored.id_counter() >= 2);
    assert_eq!(restored.selection(), None, "Restoring should not select anything");
}

#[test]
fn test_record_round_trip_is_stable() {
    let diagram = two_state_machine();
    let record = diagram.snapshot();

    let mut restored = Diagram::new();
    restored.restore(&record);
    assert_eq!(restored.snapshot(), record);
}

#[test]
fn test_deleting_a_state_cascades_to_its_links() {
    let mut diagram = two_state_machine();

    // A self-loop on B and a start marker pointing at A.
    assert!(diagram.begin_link(Point::new(250.0, 50.0)));
    diagram.update_link(Point::new(255.0, 35.0));
    assert!(diagram.commit_link());
    assert!(diagram.begin_link(Point::new(50.0, 150.0)));
    diagram.update_link(Point::new(50.0, 50.0));
    assert!(diagram.commit_link());
    assert_eq!(diagram.links().len(), 3);

    diagram.select_at(Point::new(250.0, 50.0));
    assert!(diagram.delete_selection());

    assert_eq!(diagram.nodes().len(), 1);
    assert_eq!(diagram.links().len(), 1, "Only the start marker should remain");
    assert!(matches!(diagram.links()[0], Link::Start(_)));

    let record = diagram.snapshot();
    assert!(matches!(record.links[0], LinkRecord::Start { node: 0, .. }));
}

#[test]
fn test_link_drag_into_empty_space_is_discarded() {
    let mut diagram = two_state_machine();

    assert!(diagram.begin_link(Point::new(50.0, 50.0)));
    diagram.update_link(Point::new(50.0, 300.0));
    assert!(diagram.pending_link().is_some());
    assert!(!diagram.commit_link());

    assert_eq!(diagram.links().len(), 1);
    assert!(diagram.pending_link().is_none());
}

#[test]
fn test_stray_link_indices_are_dropped() {
    let json = r#"{
        "nodes": [{"x": 10, "y": 10, "text": "", "isAcceptState": false, "isInitial": false, "id": "0"}],
        "links": [
            {"type": "SelfLink", "node": 0, "text": "", "anchorAngle": 0},
            {"type": "SelfLink", "node": 3, "text": "", "anchorAngle": 0},
            {"type": "StartLink", "node": -1, "text": "", "deltaX": 10, "deltaY": 0}
        ]
    }"#;

    let mut diagram = Diagram::new();
    diagram.restore(&DiagramRecord::from_json(json).expect("Failed to parse record"));

    assert_eq!(diagram.links().len(), 1);
    assert!(diagram.id_counter() >= 1, "Counter should stay ahead of node ids");
}
