//! Stand-in node editor: nodes with positions and selection, links between
//! them. Implements the host traits the poll driver talks to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wiggle_core::{
    driver::{LinkGraph, PositionSource},
    types::{ObjectId, SurfaceId, Vec2},
};

/// One node on the simulated surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimNode {
    pub id: ObjectId,
    pub name: String,
    /// Position in editor pixels (always whole numbers)
    pub position: [f64; 2],
    pub selected: bool,
}

/// A directed link between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: ObjectId,
    pub to: ObjectId,
}

impl Link {
    pub fn touches(&self, node: ObjectId) -> bool {
        self.from == node || self.to == node
    }
}

/// An editor with a single graph surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimEditor {
    pub surface: SurfaceId,
    /// When false the host reports no active surface (editor closed)
    pub surface_open: bool,
    pub nodes: BTreeMap<ObjectId, SimNode>,
    pub links: Vec<Link>,
}

impl SimEditor {
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            surface_open: true,
            nodes: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: u64, name: &str, position: [f64; 2], selected: bool) -> ObjectId {
        let id = ObjectId(id);
        self.nodes.insert(
            id,
            SimNode {
                id,
                name: name.to_string(),
                position: snap(position),
                selected,
            },
        );
        id
    }

    pub fn link(&mut self, from: ObjectId, to: ObjectId) {
        self.links.push(Link { from, to });
    }

    /// Move a node, snapping to whole pixels. Unknown ids are ignored.
    pub fn move_node(&mut self, id: ObjectId, position: [f64; 2]) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = snap(position);
        }
    }

    pub fn node_name(&self, id: ObjectId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name.as_str())
    }

    pub fn links_touching(&self, id: ObjectId) -> usize {
        self.links.iter().filter(|l| l.touches(id)).count()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

fn snap(p: [f64; 2]) -> [f64; 2] {
    [p[0].round(), p[1].round()]
}

impl PositionSource for SimEditor {
    fn active_surface(&self) -> Option<SurfaceId> {
        self.surface_open.then_some(self.surface)
    }

    fn relevant_objects(&self, surface: SurfaceId) -> Vec<ObjectId> {
        if surface != self.surface {
            return Vec::new();
        }
        self.nodes
            .values()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }

    fn current_position(&self, surface: SurfaceId, object: ObjectId) -> Option<Vec2> {
        if surface != self.surface {
            return None;
        }
        self.nodes
            .get(&object)
            .map(|n| Vec2::new(n.position[0], n.position[1]))
    }
}

impl LinkGraph for SimEditor {
    fn disconnect(&mut self, surface: SurfaceId, object: ObjectId) -> usize {
        if surface != self.surface {
            return 0;
        }
        let before = self.links.len();
        self.links.retain(|l| !l.touches(object));
        before - self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SimEditor {
        let mut ed = SimEditor::new(SurfaceId(3));
        let a = ed.add_node(0, "Texture", [0.0, 0.0], false);
        let b = ed.add_node(1, "Mix", [200.0, 0.0], true);
        let c = ed.add_node(2, "Output", [400.0, 0.0], false);
        ed.link(a, b);
        ed.link(b, c);
        ed.link(a, c);
        ed
    }

    #[test]
    fn disconnect_removes_only_touching_links() {
        let mut ed = chain();
        assert_eq!(ed.links_touching(ObjectId(1)), 2);
        assert_eq!(ed.disconnect(SurfaceId(3), ObjectId(1)), 2);
        assert_eq!(ed.links_touching(ObjectId(1)), 0);
        assert_eq!(ed.link_count(), 1);
        assert_eq!(ed.disconnect(SurfaceId(3), ObjectId(1)), 0);
        assert_eq!(ed.disconnect(SurfaceId(9), ObjectId(0)), 0);
    }

    #[test]
    fn only_selected_nodes_are_relevant() {
        let ed = chain();
        assert_eq!(ed.relevant_objects(SurfaceId(3)), vec![ObjectId(1)]);
        assert!(ed.relevant_objects(SurfaceId(4)).is_empty());
    }

    #[test]
    fn closed_surface_is_not_active() {
        let mut ed = chain();
        assert_eq!(ed.active_surface(), Some(SurfaceId(3)));
        ed.surface_open = false;
        assert_eq!(ed.active_surface(), None);
    }

    #[test]
    fn positions_snap_to_pixels() {
        let mut ed = chain();
        ed.move_node(ObjectId(1), [10.4, -3.6]);
        let p = ed.current_position(SurfaceId(3), ObjectId(1));
        assert_eq!(p, Some(Vec2::new(10.0, -4.0)));
    }
}
