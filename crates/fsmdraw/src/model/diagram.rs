use log::{debug, trace, warn};

use fsmdraw_core::{geometry::Point, identifier::NodeId, style::Style};

use super::{Link, Node, PlainLink, SNAP_PADDING, SelfLink, StartLink, TemporaryLink};
use crate::record::DiagramRecord;

/// The entity currently selected in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Node(NodeId),
    /// Index into [`Diagram::links`]
    Link(usize),
}

/// Pointer state captured by [`Diagram::begin_move`].
#[derive(Debug, Clone, Copy)]
enum Drag {
    Node { offset: Point },
    SelfLoop { angle_offset: f64 },
    Link,
}

/// A link being drawn.
#[derive(Debug, Clone)]
struct LinkDraft {
    source: Option<NodeId>,
    origin: Point,
    link: Link,
}

/// A finite-state-machine diagram.
///
/// Owns the nodes and links together with the interaction state (selection,
/// an in-progress move or link drag) and the counter node identifiers are
/// drawn from. Every operation takes the diagram explicitly; callers are
/// expected to finish a mutation before rendering.
///
/// # Examples
///
/// ```
/// use fsmdraw::{geometry::Point, model::Diagram};
///
/// let mut diagram = Diagram::new();
/// let a = diagram.create_node(Point::new(50.0, 50.0));
/// let b = diagram.create_node(Point::new(250.0, 50.0));
///
/// diagram.begin_link(Point::new(50.0, 50.0));
/// diagram.update_link(Point::new(250.0, 50.0));
/// assert!(diagram.commit_link());
///
/// assert_eq!(diagram.links().len(), 1);
/// assert!(diagram.links()[0].references(a));
/// assert!(diagram.links()[0].references(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: Vec<Node>,
    links: Vec<Link>,
    style: Style,
    id_counter: u64,
    selection: Option<Selection>,
    drag: Option<Drag>,
    draft: Option<LinkDraft>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Committed links, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        debug!(style:% = style; "Style changed");
        self.style = style;
    }

    /// Next value handed out as a node identifier.
    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// The preview of the link being drawn, if any.
    pub fn pending_link(&self) -> Option<&Link> {
        self.draft.as_ref().map(|draft| &draft.link)
    }

    /// Returns `true` if `selection` refers to the given link index.
    pub fn is_link_selected(&self, index: usize) -> bool {
        self.selection == Some(Selection::Link(index))
    }

    /// Returns `true` if `selection` refers to the given node.
    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.selection == Some(Selection::Node(id))
    }

    /// First node containing `point`, in insertion order.
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.nodes.iter().find(|node| node.contains_point(point))
    }

    /// Hit-tests nodes first, then links, each in insertion order.
    pub fn entity_at(&self, point: Point) -> Option<Selection> {
        if let Some(node) = self.node_at(point) {
            return Some(Selection::Node(node.id()));
        }
        self.links
            .iter()
            .position(|link| link.contains_point(&self.nodes, point))
            .map(Selection::Link)
    }

    /// Selects whatever lies under `point`, clearing the selection otherwise.
    pub fn select_at(&mut self, point: Point) -> Option<Selection> {
        self.selection = self.entity_at(point);
        trace!(selection:? = self.selection; "Selection updated");
        self.selection
    }

    /// Adds a node at `point` with a fresh identifier and selects it.
    pub fn create_node(&mut self, point: Point) -> NodeId {
        let id = self.next_id();
        self.nodes.push(Node::new(id, point));
        self.selection = Some(Selection::Node(id));
        debug!(id:% = id, x = point.x(), y = point.y(); "Node created");
        id
    }

    /// Appends an already built node.
    ///
    /// Returns `false` and leaves the diagram unchanged if the identifier is
    /// already taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node(node.id()).is_some() {
            warn!(id:% = node.id(); "Duplicate node identifier rejected");
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Appends an already built link.
    ///
    /// Returns `false` and leaves the diagram unchanged for previews and for
    /// links referring to nodes that are not part of the diagram.
    pub fn add_link(&mut self, link: Link) -> bool {
        let resolves = match &link {
            Link::Plain(link) => {
                self.node(link.node_a()).is_some() && self.node(link.node_b()).is_some()
            }
            Link::SelfLoop(link) => self.node(link.node()).is_some(),
            Link::Start(link) => self.node(link.node()).is_some(),
            Link::Temporary(_) => false,
        };
        if !resolves {
            warn!(kind = link.kind(); "Link with unresolved nodes rejected");
            return false;
        }
        self.links.push(link);
        true
    }

    /// Starts moving the selected entity, grabbed at `point`.
    pub fn begin_move(&mut self, point: Point) -> bool {
        self.drag = match self.selection {
            Some(Selection::Node(id)) => self.node(id).map(|node| Drag::Node {
                offset: node.position().sub_point(point),
            }),
            Some(Selection::Link(index)) => match self.links.get(index) {
                Some(Link::SelfLoop(link)) => self
                    .node(link.node())
                    .map(|node| Drag::SelfLoop {
                        angle_offset: link.angle_offset(node, point),
                    }),
                Some(_) => Some(Drag::Link),
                None => None,
            },
            None => None,
        };
        self.drag.is_some()
    }

    /// Drags the selected entity to follow `point`.
    ///
    /// Nodes keep their grab offset and then align with any other node whose
    /// x or y coordinate is within the snap distance. Links are re-anchored.
    pub fn move_selection(&mut self, point: Point) {
        let (Some(drag), Some(selection)) = (self.drag, self.selection) else {
            return;
        };

        match (drag, selection) {
            (Drag::Node { offset }, Selection::Node(id)) => {
                let position = self.aligned_position(id, point.add_point(offset));
                if let Some(node) = self.nodes.iter_mut().find(|node| node.id() == id) {
                    node.set_position(position);
                }
            }
            (Drag::SelfLoop { angle_offset }, Selection::Link(index)) => {
                if let Some(Link::SelfLoop(link)) = self.links.get_mut(index) {
                    if let Some(node) = self.nodes.iter().find(|node| node.id() == link.node()) {
                        link.set_anchor(node, point, angle_offset);
                    }
                }
            }
            (Drag::Link, Selection::Link(index)) => {
                if let Some(link) = self.links.get_mut(index) {
                    link.set_anchor(&self.nodes, point);
                }
            }
            _ => {}
        }
    }

    pub fn end_move(&mut self) {
        self.drag = None;
    }

    fn aligned_position(&self, id: NodeId, mut position: Point) -> Point {
        for other in self.nodes.iter().filter(|node| node.id() != id) {
            if (position.x() - other.position().x()).abs() < SNAP_PADDING {
                position = position.with_x(other.position().x());
            }
            if (position.y() - other.position().y()).abs() < SNAP_PADDING {
                position = position.with_y(other.position().y());
            }
        }
        position
    }

    /// Starts drawing a link at `point`.
    ///
    /// Starting over a node selects it and previews a self-loop; starting
    /// over empty space previews a free segment. Starting over a link does
    /// nothing and returns `false`.
    pub fn begin_link(&mut self, point: Point) -> bool {
        self.drag = None;
        let draft = match self.select_at(point) {
            Some(Selection::Node(id)) => {
                let Some(node) = self.node(id) else {
                    return false;
                };
                let mut link = SelfLink::new(id);
                link.set_anchor(node, point, 0.0);
                LinkDraft {
                    source: Some(id),
                    origin: point,
                    link: Link::SelfLoop(link),
                }
            }
            Some(Selection::Link(_)) => return false,
            None => LinkDraft {
                source: None,
                origin: point,
                link: Link::Temporary(TemporaryLink::new(point, point)),
            },
        };
        self.draft = Some(draft);
        true
    }

    /// Re-targets the link being drawn at `point`.
    ///
    /// From a source node: back over the source gives a self-loop, over
    /// another node a plain link, over nothing a preview from the source
    /// outline. From empty space: over a node gives a start marker whose
    /// origin is where the drag began, over nothing a free preview.
    pub fn update_link(&mut self, point: Point) {
        let Some(draft) = &self.draft else {
            return;
        };
        let target = self.node_at(point);

        let link = match (draft.source.and_then(|id| self.node(id)), target) {
            (None, Some(target)) => {
                let mut link = StartLink::new(target.id());
                link.set_anchor(target, draft.origin);
                Link::Start(link)
            }
            (None, None) => Link::Temporary(TemporaryLink::new(draft.origin, point)),
            (Some(source), Some(target)) if source.id() == target.id() => {
                let mut link = SelfLink::new(source.id());
                link.set_anchor(source, point, 0.0);
                Link::SelfLoop(link)
            }
            (Some(source), Some(target)) => Link::Plain(PlainLink::new(source.id(), target.id())),
            (Some(source), None) => {
                Link::Temporary(TemporaryLink::new(source.closest_point(point), point))
            }
        };

        if let Some(draft) = &mut self.draft {
            draft.link = link;
        }
    }

    /// Adds the drawn link to the diagram and selects it.
    ///
    /// Returns `false` if nothing was being drawn or the drag ended over
    /// empty space.
    pub fn commit_link(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        if draft.link.is_temporary() {
            trace!("Link drag ended without a target");
            return false;
        }
        debug!(kind = draft.link.kind(); "Link committed");
        self.links.push(draft.link);
        self.selection = Some(Selection::Link(self.links.len() - 1));
        true
    }

    /// Drops the link being drawn.
    pub fn cancel_link(&mut self) {
        self.draft = None;
    }

    fn selected_text_mut(&mut self) -> Option<&mut String> {
        match self.selection? {
            Selection::Node(id) => self
                .nodes
                .iter_mut()
                .find(|node| node.id() == id)
                .map(Node::text_mut),
            Selection::Link(index) => self.links.get_mut(index).and_then(Link::text_mut),
        }
    }

    /// Appends a printable ASCII character to the selected label.
    pub fn push_char(&mut self, c: char) -> bool {
        if !(' '..='~').contains(&c) {
            return false;
        }
        self.selected_text_mut()
            .map(|text| text.push(c))
            .is_some()
    }

    /// Removes the last character of the selected label.
    pub fn backspace(&mut self) -> bool {
        self.selected_text_mut()
            .map(|text| {
                text.pop();
            })
            .is_some()
    }

    /// Replaces the selected label.
    pub fn set_text(&mut self, text: &str) -> bool {
        self.selected_text_mut()
            .map(|label| {
                label.clear();
                label.push_str(text);
            })
            .is_some()
    }

    fn selected_node_mut(&mut self) -> Option<&mut Node> {
        let Some(Selection::Node(id)) = self.selection else {
            return None;
        };
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Flips the accept flag of the selected node.
    pub fn toggle_accept(&mut self) -> bool {
        self.selected_node_mut()
            .map(Node::toggle_accept_state)
            .is_some()
    }

    /// Flips the initial flag of the selected node.
    pub fn toggle_initial(&mut self) -> bool {
        self.selected_node_mut()
            .map(Node::toggle_initial)
            .is_some()
    }

    /// Deletes the selected entity.
    ///
    /// Deleting a node also deletes every link attached to it.
    pub fn delete_selection(&mut self) -> bool {
        self.drag = None;
        self.draft = None;
        match self.selection.take() {
            Some(Selection::Node(id)) => {
                let before = self.links.len();
                self.nodes.retain(|node| node.id() != id);
                self.links.retain(|link| !link.references(id));
                debug!(id:% = id, removed_links = before - self.links.len(); "Node deleted");
                true
            }
            Some(Selection::Link(index)) if index < self.links.len() => {
                let link = self.links.remove(index);
                debug!(kind = link.kind(); "Link deleted");
                true
            }
            _ => false,
        }
    }

    /// Removes every entity and restarts identifier numbering.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.selection = None;
        self.drag = None;
        self.draft = None;
        self.id_counter = 0;
    }

    /// Captures the persisted state as a storage-neutral record.
    pub fn snapshot(&self) -> DiagramRecord {
        DiagramRecord::from_diagram(self)
    }

    /// Replaces the contents with those of `record`.
    ///
    /// Links whose node indices are out of range are dropped.
    pub fn restore(&mut self, record: &DiagramRecord) {
        record.restore_into(self);
    }

    fn next_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::from_counter(self.id_counter);
            self.id_counter += 1;
            if self.node(id).is_none() {
                return id;
            }
        }
    }

    pub(crate) fn fresh_id(&mut self) -> NodeId {
        self.next_id()
    }

    pub(crate) fn set_id_counter(&mut self, id_counter: u64) {
        self.id_counter = id_counter;
    }

    pub(crate) fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }
}
