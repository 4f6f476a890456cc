//! The storage-neutral diagram record.
//!
//! A [`DiagramRecord`] is the persisted form of a [`Diagram`]: nodes as an
//! ordered list, links as tagged entries that refer to nodes by their index
//! in that list. It serializes to the JSON shape
//!
//! ```text
//! { "nodes": [{x, y, text, isAcceptState, isInitial, id}],
//!   "links": [{"type": "PlainLink" | "SelfLink" | "StartLink", ...}],
//!   "style": "default", "idCounter": 2 }
//! ```
//!
//! Records written by older editors use `"Link"` for plain links and
//! `"globalCounter"` for the counter; both are accepted on input.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use fsmdraw_core::{geometry::Point, identifier::NodeId, style::Style};

use crate::{
    error::FsmError,
    model::{
        Diagram, Link, Node, PlainLink, SelfLink, StartLink, snap_perpendicular,
        snap_quarter_turn,
    },
};

/// Persisted form of a [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_accept_state: bool,
    #[serde(default)]
    pub is_initial: bool,
    pub id: NodeId,
}

fn default_parallel_part() -> f64 {
    0.5
}

/// Persisted form of a [`Link`], referring to nodes by index.
///
/// Indices are signed so that a stray negative index only drops its link
/// instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LinkRecord {
    #[serde(rename = "PlainLink", alias = "Link")]
    Plain {
        #[serde(rename = "nodeA")]
        node_a: i64,
        #[serde(rename = "nodeB")]
        node_b: i64,
        #[serde(default)]
        text: String,
        #[serde(rename = "lineAngleAdjust", default)]
        line_angle_adjust: f64,
        #[serde(rename = "parallelPart", default = "default_parallel_part")]
        parallel_part: f64,
        #[serde(rename = "perpendicularPart", default)]
        perpendicular_part: f64,
    },
    #[serde(rename = "SelfLink")]
    SelfLoop {
        node: i64,
        #[serde(default)]
        text: String,
        #[serde(rename = "anchorAngle", default)]
        anchor_angle: f64,
    },
    #[serde(rename = "StartLink")]
    Start {
        node: i64,
        #[serde(default)]
        text: String,
        #[serde(rename = "deltaX", default)]
        delta_x: f64,
        #[serde(rename = "deltaY", default)]
        delta_y: f64,
    },
}

/// Persisted form of a [`Diagram`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub style: String,
    #[serde(default, alias = "globalCounter")]
    pub id_counter: Option<u64>,
}

impl DiagramRecord {
    /// Parses a JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Record`] carrying the source text if the JSON is
    /// malformed or misses required fields.
    pub fn from_json(src: &str) -> Result<Self, FsmError> {
        serde_json::from_str(src).map_err(|err| FsmError::new_record_error(err, src))
    }

    /// Serializes the record to compact JSON.
    pub fn to_json(&self) -> Result<String, FsmError> {
        serde_json::to_string(self).map_err(|err| FsmError::new_record_error(err, ""))
    }

    pub(crate) fn from_diagram(diagram: &Diagram) -> Self {
        let nodes = diagram.nodes();
        let index_of = |id: NodeId| {
            nodes
                .iter()
                .position(|node| node.id() == id)
                .and_then(|index| i64::try_from(index).ok())
                .unwrap_or(-1)
        };

        let links = diagram
            .links()
            .iter()
            .filter_map(|link| match link {
                Link::Plain(link) => Some(LinkRecord::Plain {
                    node_a: index_of(link.node_a()),
                    node_b: index_of(link.node_b()),
                    text: link.text().to_string(),
                    line_angle_adjust: link.line_angle_adjust(),
                    parallel_part: link.parallel_part(),
                    perpendicular_part: link.perpendicular_part(),
                }),
                Link::SelfLoop(link) => Some(LinkRecord::SelfLoop {
                    node: index_of(link.node()),
                    text: link.text().to_string(),
                    anchor_angle: link.anchor_angle(),
                }),
                Link::Start(link) => Some(LinkRecord::Start {
                    node: index_of(link.node()),
                    text: link.text().to_string(),
                    delta_x: link.delta().x(),
                    delta_y: link.delta().y(),
                }),
                Link::Temporary(_) => None,
            })
            .collect();

        Self {
            nodes: nodes
                .iter()
                .map(|node| NodeRecord {
                    x: node.position().x(),
                    y: node.position().y(),
                    text: node.text().to_string(),
                    is_accept_state: node.is_accept_state(),
                    is_initial: node.is_initial(),
                    id: node.id(),
                })
                .collect(),
            links,
            style: diagram.style().to_string(),
            id_counter: Some(diagram.id_counter()),
        }
    }

    /// Rebuilds `diagram` from this record: nodes first, then links resolved
    /// against the rebuilt node list.
    pub(crate) fn restore_into(&self, diagram: &mut Diagram) {
        diagram.clear();

        let style = if self.style.is_empty() {
            Style::default()
        } else {
            self.style.parse().unwrap_or_else(|err| {
                warn!(err:% = err; "Unknown style in record, using default");
                Style::default()
            })
        };
        diagram.set_style(style);

        // Keep the counter ahead of every numeric identifier in the record.
        let next_numeric = self
            .nodes
            .iter()
            .filter_map(|node| node.id.to_string().parse::<u64>().ok())
            .map(|value| value.saturating_add(1))
            .max()
            .unwrap_or(0);
        diagram.set_id_counter(self.id_counter.unwrap_or(0).max(next_numeric));

        let mut ids = Vec::with_capacity(self.nodes.len());
        for record in &self.nodes {
            let mut node = Node::new(record.id, Point::new(record.x, record.y))
                .with_text(record.text.clone())
                .with_initial(record.is_initial)
                .with_accept_state(record.is_accept_state);
            if diagram.node(record.id).is_some() {
                let id = diagram.fresh_id();
                warn!(duplicate:% = record.id, id:% = id; "Duplicate node identifier renamed");
                node.set_id(id);
            }
            ids.push(node.id());
            diagram.add_node(node);
        }

        let resolve = |index: i64| usize::try_from(index).ok().and_then(|i| ids.get(i).copied());

        let mut dropped = 0;
        for record in &self.links {
            let link = match record {
                LinkRecord::Plain {
                    node_a,
                    node_b,
                    text,
                    line_angle_adjust,
                    parallel_part,
                    perpendicular_part,
                } => resolve(*node_a).zip(resolve(*node_b)).map(|(a, b)| {
                    let snapped = snap_perpendicular(*perpendicular_part);
                    if snapped != *perpendicular_part {
                        warn!(
                            perpendicular_part = perpendicular_part,
                            snapped = snapped;
                            "Snapping off-grid link bend"
                        );
                    }
                    Link::Plain(
                        PlainLink::new(a, b)
                            .with_anchor_parts(*parallel_part, snapped, *line_angle_adjust)
                            .with_text(text.clone()),
                    )
                }),
                LinkRecord::SelfLoop {
                    node,
                    text,
                    anchor_angle,
                } => resolve(*node).map(|id| {
                    let snapped = snap_quarter_turn(*anchor_angle);
                    if snapped != *anchor_angle {
                        warn!(
                            anchor_angle = anchor_angle,
                            snapped = snapped;
                            "Snapping off-grid self-loop angle"
                        );
                    }
                    Link::SelfLoop(
                        SelfLink::new(id)
                            .with_anchor_angle(snapped)
                            .with_text(text.clone()),
                    )
                }),
                LinkRecord::Start {
                    node,
                    text,
                    delta_x,
                    delta_y,
                } => resolve(*node).map(|id| {
                    Link::Start(
                        StartLink::new(id)
                            .with_delta(Point::new(*delta_x, *delta_y))
                            .with_text(text.clone()),
                    )
                }),
            };

            match link {
                Some(link) => diagram.push_link(link),
                None => {
                    dropped += 1;
                    warn!(link:? = record; "Dropping link with out-of-range node index");
                }
            }
        }

        debug!(dropped = dropped; "Links restored");
        info!(
            nodes = diagram.nodes().len(),
            links = diagram.links().len();
            "Diagram restored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_record() {
        let src = r#"{
            "nodes": [
                {"x": 10, "y": 20, "text": "q0", "isAcceptState": false, "id": "0", "isInitial": true},
                {"x": 110, "y": 20, "text": "q1", "isAcceptState": true, "id": "1", "isInitial": false}
            ],
            "links": [
                {"type": "Link", "nodeA": 0, "nodeB": 1, "text": "a", "lineAngleAdjust": 0,
                 "parallelPart": 0.5, "perpendicularPart": 30},
                {"type": "SelfLink", "node": 1, "text": "b", "anchorAngle": 1.5707963267948966}
            ],
            "style": "style1",
            "globalCounter": 2
        }"#;
        let record = DiagramRecord::from_json(src).unwrap();
        assert_eq!(record.nodes.len(), 2);
        assert_eq!(record.id_counter, Some(2));
        assert!(matches!(
            record.links[0],
            LinkRecord::Plain { perpendicular_part, .. } if perpendicular_part == 30.0
        ));

        let mut diagram = Diagram::new();
        diagram.restore(&record);
        assert_eq!(diagram.style(), Style::Style1);
        assert_eq!(diagram.links().len(), 2);
    }

    #[test]
    fn test_serialize_uses_record_field_names() {
        let mut diagram = Diagram::new();
        let a = diagram.create_node(Point::new(1.0, 2.0));
        diagram.add_link(Link::Start(StartLink::new(a).with_delta(Point::new(-40.0, 0.0))));

        let json = diagram.snapshot().to_json().unwrap();
        assert!(json.contains(r#""isAcceptState":false"#));
        assert!(json.contains(r#""type":"StartLink""#));
        assert!(json.contains(r#""deltaX":-40.0"#));
        assert!(json.contains(r#""idCounter":1"#));
        assert!(json.contains(r#""style":"default""#));
    }

    #[test]
    fn test_out_of_range_links_are_dropped() {
        let src = r#"{
            "nodes": [{"x": 0, "y": 0, "id": "0"}],
            "links": [
                {"type": "SelfLink", "node": 3, "anchorAngle": 0},
                {"type": "StartLink", "node": -1, "deltaX": 10, "deltaY": 0},
                {"type": "StartLink", "node": 0, "deltaX": -50, "deltaY": 0}
            ]
        }"#;
        let record = DiagramRecord::from_json(src).unwrap();
        let mut diagram = Diagram::new();
        diagram.restore(&record);
        assert_eq!(diagram.links().len(), 1);
        assert!(matches!(diagram.links()[0], Link::Start(_)));
        assert_eq!(diagram.id_counter(), 1);
    }

    #[test]
    fn test_malformed_record_is_an_error() {
        assert!(matches!(
            DiagramRecord::from_json(r#"{"nodes": [{"x": "left"}]}"#),
            Err(FsmError::Record { .. })
        ));
        assert!(DiagramRecord::from_json("not json").is_err());
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        let record = DiagramRecord {
            style: "neon".to_string(),
            ..DiagramRecord::default()
        };
        let mut diagram = Diagram::new();
        diagram.set_style(Style::Style2);
        diagram.restore(&record);
        assert_eq!(diagram.style(), Style::Default);
    }

    #[test]
    fn test_duplicate_ids_are_renamed() {
        let src = r#"{"nodes": [{"x": 0, "y": 0, "id": "0"}, {"x": 90, "y": 0, "id": "0"}], "links": []}"#;
        let record = DiagramRecord::from_json(src).unwrap();
        let mut diagram = Diagram::new();
        diagram.restore(&record);
        assert_eq!(diagram.nodes().len(), 2);
        assert_ne!(diagram.nodes()[0].id(), diagram.nodes()[1].id());
    }

    #[test]
    fn test_off_grid_anchors_are_snapped() {
        let src = r#"{
            "nodes": [{"x": 0, "y": 0, "id": "0"}, {"x": 200, "y": 0, "id": "1"}],
            "links": [
                {"type": "PlainLink", "nodeA": 0, "nodeB": 1, "text": "", "lineAngleAdjust": 0,
                 "parallelPart": 0.5, "perpendicularPart": 47},
                {"type": "PlainLink", "nodeA": 1, "nodeB": 0, "text": "", "lineAngleAdjust": 0,
                 "parallelPart": 0.5, "perpendicularPart": -250},
                {"type": "SelfLink", "node": 0, "text": "", "anchorAngle": 1.4}
            ]
        }"#;
        let mut diagram = Diagram::new();
        diagram.restore(&DiagramRecord::from_json(src).unwrap());

        let parts: Vec<f64> = diagram
            .links()
            .iter()
            .filter_map(|link| match link {
                Link::Plain(link) => Some(link.perpendicular_part()),
                _ => None,
            })
            .collect();
        assert_eq!(parts, vec![60.0, -100.0]);

        let Link::SelfLoop(self_loop) = &diagram.links()[2] else {
            panic!("Expected a self-loop");
        };
        assert!((self_loop.anchor_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
