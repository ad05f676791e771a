//! Edit engine: strokes, undo and redo over one grid
//!
//! An `Editor` is either idle or in the middle of a stroke. A stroke is
//! opened with `begin_edit`, fed points with `add_points`/`brush_points`,
//! and closed with `commit_edit`, which turns it into one undoable
//! `Edit`. Undo and redo are refused while a stroke is open.
//!
//! Observers get a fresh `Snapshot` after every change to the grid and an
//! `AllowedActions` value whenever undo/redo availability may have
//! changed.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use thiserror::Error;

use crate::brush::square_around;
use crate::dna::Dna;
use crate::envelope::{Envelope, EnvelopeError};
use crate::grid::{Grid, Point, Snapshot};
use crate::import::{parse_image, ImportError};
use crate::observer::{SubscriptionId, Subscribers};
use crate::palette::Color;

/// Error type for calls made in the wrong editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    /// `begin_edit` while a stroke is open
    #[error("an edit is already in progress")]
    EditInProgress,
    /// Stroke operation without an open stroke
    #[error("no in-progress edit")]
    NoEditInProgress,
    /// Stroke open or nothing to undo
    #[error("undo is not allowed")]
    UndoNotAllowed,
    /// Stroke open or nothing to redo
    #[error("redo is not allowed")]
    RedoNotAllowed,
}

/// One undoable stroke: every touched point with the color it had before,
/// and the color that was painted over all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub from: Vec<(Point, Color)>,
    pub to: Color,
}

impl Edit {
    fn new(to: Color) -> Self {
        Edit { from: Vec::new(), to }
    }

    /// Points the stroke touched, in the order they were first touched.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.from.iter().map(|(point, _)| *point)
    }

    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }
}

/// Whether undo and redo may currently be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AllowedActions {
    pub undo: bool,
    pub redo: bool,
}

/// The open stroke.
#[derive(Debug)]
struct EditSession {
    edit: Edit,
    touched: HashSet<Point>,
}

/// Owner of one grid and its undo history.
#[derive(Debug)]
pub struct Editor {
    grid: Grid,
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    session: Option<EditSession>,
    state_subscribers: Subscribers<Snapshot>,
    action_subscribers: Subscribers<AllowedActions>,
}

impl Editor {
    /// A blank canvas with no history.
    pub fn empty() -> Self {
        Self::from_parts(Grid::new(), Vec::new(), Vec::new())
    }

    fn from_parts(grid: Grid, undo_stack: Vec<Edit>, redo_stack: Vec<Edit>) -> Self {
        Editor {
            grid,
            undo_stack,
            redo_stack,
            session: None,
            state_subscribers: Subscribers::new(),
            action_subscribers: Subscribers::new(),
        }
    }

    /// Restore from a saved document, `None` if it is not a valid one.
    pub fn restore(json: &str) -> Option<Self> {
        Self::try_restore(json).ok()
    }

    /// Restore from a saved document, reporting why it was rejected.
    pub fn try_restore(json: &str) -> Result<Self, EnvelopeError> {
        let envelope = Envelope::parse(json)?;
        Ok(Self::from_parts(envelope.state, envelope.undo, envelope.redo))
    }

    /// Serialize grid and history.
    ///
    /// An open stroke is saved as if it had been committed, so the pixels
    /// it already painted stay undoable after a restore.
    pub fn save(&self) -> Result<String, EnvelopeError> {
        self.envelope().to_json()
    }

    /// Grid and history as a persistence document.
    pub fn envelope(&self) -> Envelope {
        let mut undo = self.undo_stack.clone();
        if let Some(session) = &self.session {
            if !session.edit.is_empty() {
                undo.push(session.edit.clone());
            }
        }
        Envelope { state: self.grid.clone(), undo, redo: self.redo_stack.clone() }
    }

    /// Current grid contents.
    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Committed strokes, oldest first.
    pub fn undo_stack(&self) -> &[Edit] {
        &self.undo_stack
    }

    /// Undone strokes, the next one to redo last.
    pub fn redo_stack(&self) -> &[Edit] {
        &self.redo_stack
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// True when nothing is painted.
    pub fn is_empty(&self) -> bool {
        self.grid.is_blank()
    }

    pub fn allowed_actions(&self) -> AllowedActions {
        let idle = self.session.is_none();
        AllowedActions {
            undo: idle && !self.undo_stack.is_empty(),
            redo: idle && !self.redo_stack.is_empty(),
        }
    }

    /// DNA of the current grid.
    pub fn dna(&self) -> Dna {
        Dna::from_grid(&self.grid)
    }

    /// Call `callback` with a snapshot after every grid change.
    pub fn subscribe_state<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.state_subscribers.subscribe(callback)
    }

    /// Call `callback` with a snapshot after every grid change, for as
    /// long as it returns `true`.
    pub fn subscribe_state_while<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) -> bool + Send + 'static,
    {
        self.state_subscribers.subscribe_while(callback)
    }

    /// Receive snapshots over a channel.
    pub fn state_channel(&mut self) -> Receiver<Snapshot> {
        self.state_subscribers.channel()
    }

    pub fn unsubscribe_state(&mut self, id: SubscriptionId) -> bool {
        self.state_subscribers.unsubscribe(id)
    }

    /// Call `callback` whenever undo/redo availability is recomputed.
    pub fn subscribe_actions<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AllowedActions) + Send + 'static,
    {
        self.action_subscribers.subscribe(callback)
    }

    /// Call `callback` whenever undo/redo availability is recomputed, for
    /// as long as it returns `true`.
    pub fn subscribe_actions_while<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AllowedActions) -> bool + Send + 'static,
    {
        self.action_subscribers.subscribe_while(callback)
    }

    /// Live (state, action) subscriber counts.
    #[cfg(test)]
    pub(crate) fn subscriber_counts(&self) -> (usize, usize) {
        (self.state_subscribers.len(), self.action_subscribers.len())
    }

    /// Receive allowed-action updates over a channel.
    pub fn actions_channel(&mut self) -> Receiver<AllowedActions> {
        self.action_subscribers.channel()
    }

    pub fn unsubscribe_actions(&mut self, id: SubscriptionId) -> bool {
        self.action_subscribers.unsubscribe(id)
    }

    /// Open a stroke painting `color`. Clears the redo history.
    pub fn begin_edit(&mut self, color: Color) -> Result<(), EditError> {
        if self.session.is_some() {
            return Err(EditError::EditInProgress);
        }
        debug!("begin edit with color {}", color);
        self.session = Some(EditSession { edit: Edit::new(color), touched: HashSet::new() });
        self.redo_stack.clear();
        self.notify_actions();
        Ok(())
    }

    /// Paint `points` with the stroke color.
    ///
    /// Points already touched by this stroke are skipped, so the recorded
    /// previous color is always the one from before the stroke.
    pub fn add_points<I>(&mut self, points: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = Point>,
    {
        let session = self.session.as_mut().ok_or(EditError::NoEditInProgress)?;
        let mut changed = false;
        for point in points {
            if session.touched.insert(point) {
                session.edit.from.push((point, self.grid.get(point)));
                self.grid.set(point, session.edit.to);
                changed = true;
            }
        }
        if changed {
            self.notify_state();
        }
        Ok(())
    }

    /// Paint the `(2 * size + 1)`-wide square around `center`.
    pub fn brush_points(&mut self, center: Point, size: u8) -> Result<(), EditError> {
        self.add_points(square_around(center, size))
    }

    /// Close the stroke and push it onto the undo history.
    pub fn commit_edit(&mut self) -> Result<(), EditError> {
        let session = self.session.take().ok_or(EditError::NoEditInProgress)?;
        debug!("commit edit touching {} pixels", session.edit.len());
        self.undo_stack.push(session.edit);
        self.notify_actions();
        Ok(())
    }

    /// Revert the most recent committed stroke.
    pub fn undo(&mut self) -> Result<(), EditError> {
        if self.session.is_some() {
            return Err(EditError::UndoNotAllowed);
        }
        let edit = self.undo_stack.pop().ok_or(EditError::UndoNotAllowed)?;
        for (point, color) in &edit.from {
            self.grid.set(*point, *color);
        }
        debug!("undo edit touching {} pixels", edit.len());
        self.redo_stack.push(edit);
        self.notify_state();
        self.notify_actions();
        Ok(())
    }

    /// Re-apply the most recently undone stroke.
    pub fn redo(&mut self) -> Result<(), EditError> {
        if self.session.is_some() {
            return Err(EditError::RedoNotAllowed);
        }
        let edit = self.redo_stack.pop().ok_or(EditError::RedoNotAllowed)?;
        for point in edit.points() {
            self.grid.set(point, edit.to);
        }
        debug!("redo edit touching {} pixels", edit.len());
        self.undo_stack.push(edit);
        self.notify_state();
        self.notify_actions();
        Ok(())
    }

    /// Blank the canvas and drop all history, including an open stroke.
    ///
    /// This cannot be undone.
    pub fn clear(&mut self) {
        self.replace_grid(Grid::new());
    }

    /// Replace the canvas wholesale, dropping all history.
    pub fn load_grid(&mut self, grid: Grid) {
        self.replace_grid(grid);
    }

    /// Replace the canvas with a decoded DNA string.
    ///
    /// Returns `false` and leaves the editor untouched if `dna` is invalid.
    pub fn load_from_dna(&mut self, dna: &str) -> bool {
        match Dna::from_base64(dna) {
            Some(dna) => {
                self.replace_grid(dna.to_grid());
                true
            }
            None => false,
        }
    }

    /// Replace the canvas with an imported image file.
    ///
    /// On failure the editor is left untouched.
    pub fn load_from_image(&mut self, extension: &str, bytes: &[u8]) -> Result<(), ImportError> {
        let grid = parse_image(extension, bytes)?;
        self.replace_grid(grid);
        Ok(())
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.session = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify_state();
        self.notify_actions();
    }

    fn notify_state(&mut self) {
        if !self.state_subscribers.is_empty() {
            let snapshot = self.grid.snapshot();
            self.state_subscribers.emit(&snapshot);
        }
    }

    fn notify_actions(&mut self) {
        let actions = self.allowed_actions();
        self.action_subscribers.emit(&actions);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::empty()
    }
}
