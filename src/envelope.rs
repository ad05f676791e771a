//! Persistence document for an editor session
//!
//! ```json
//! {
//!   "state": [[63, 63, ...], ...],
//!   "undo": [{"from": [[{"x": 0, "y": 0}, 63]], "to": 3}],
//!   "redo": []
//! }
//! ```
//!
//! `state` is 64 rows of 64 palette indices (`state[y][x]`). Every index
//! must be a palette entry and every coordinate must be on the grid; a
//! single bad value rejects the whole document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::Edit;
use crate::grid::Grid;

/// Error type for persistence documents
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Malformed JSON or a value outside its valid range
    #[error("invalid editor document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Grid plus undo and redo history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    pub state: Grid,
    pub undo: Vec<Edit>,
    pub redo: Vec<Edit>,
}

impl Envelope {
    /// Parse and validate a document.
    pub fn parse(json: &str) -> Result<Envelope, EnvelopeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;
    use crate::palette::Color;
    use serde_json::json;

    fn blank_rows() -> serde_json::Value {
        json!(vec![vec![63; 64]; 64])
    }

    fn doc(state: serde_json::Value, undo: serde_json::Value) -> String {
        json!({ "state": state, "undo": undo, "redo": [] }).to_string()
    }

    #[test]
    fn test_parse_minimal() {
        let envelope = Envelope::parse(&doc(blank_rows(), json!([]))).unwrap();
        assert_eq!(envelope.state, Grid::new());
        assert!(envelope.undo.is_empty());
    }

    #[test]
    fn test_parse_edit_records() {
        let undo = json!([{ "from": [[{ "x": 1, "y": 2 }, 63], [{ "x": 0, "y": 0 }, 5]], "to": 3 }]);
        let envelope = Envelope::parse(&doc(blank_rows(), undo)).unwrap();
        let edit = &envelope.undo[0];
        assert_eq!(edit.to, Color::parse(3).unwrap());
        assert_eq!(edit.from[0], (Point::new(1, 2).unwrap(), Color::WHITE));
        assert_eq!(edit.from[1].1, Color::parse(5).unwrap());
    }

    #[test]
    fn test_round_trip() {
        let mut state = Grid::new();
        state.set(Point::new(4, 5).unwrap(), Color::BLACK);
        let envelope = Envelope {
            state,
            undo: vec![Edit {
                from: vec![(Point::new(4, 5).unwrap(), Color::WHITE)],
                to: Color::BLACK,
            }],
            redo: vec![],
        };
        let json = envelope.to_json().unwrap();
        assert_eq!(Envelope::parse(&json).unwrap(), envelope);
    }

    #[test]
    fn test_rejects_out_of_range_pixel() {
        let mut rows = vec![vec![63; 64]; 64];
        rows[3][3] = 64;
        assert!(Envelope::parse(&doc(json!(rows), json!([]))).is_err());
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let rows = vec![vec![63; 64]; 63];
        assert!(Envelope::parse(&doc(json!(rows), json!([]))).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_point() {
        let undo = json!([{ "from": [[{ "x": 64, "y": 0 }, 1]], "to": 3 }]);
        assert!(Envelope::parse(&doc(blank_rows(), undo)).is_err());
        let undo = json!([{ "from": [[{ "x": -1, "y": 0 }, 1]], "to": 3 }]);
        assert!(Envelope::parse(&doc(blank_rows(), undo)).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_target() {
        let undo = json!([{ "from": [], "to": 64 }]);
        assert!(Envelope::parse(&doc(blank_rows(), undo)).is_err());
    }

    #[test]
    fn test_rejects_missing_history() {
        let json = json!({ "state": blank_rows(), "undo": [] }).to_string();
        assert!(Envelope::parse(&json).is_err());
    }
}
