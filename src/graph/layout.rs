use serde::{Serialize, Deserialize};
use crate::graph::{Node, Position};

/// "Format canvas" grid: nodes are laid out row by row in array order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            spacing_x: 250.0,
            spacing_y: 150.0,
            origin_x: 300.0,
            origin_y: 100.0,
        }
    }
}

impl GridLayout {
    pub fn position(&self, index: usize) -> Position {
        // A zero-column grid would divide by zero; treat it as a single column.
        let columns = self.columns.max(1);
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        Position {
            x: self.origin_x + col * self.spacing_x,
            y: self.origin_y + row * self.spacing_y,
        }
    }

    /// Adapter for [`crate::graph::Graph::reposition_all`].
    pub fn place(&self, _node: &Node, index: usize) -> Position {
        self.position(index)
    }
}
