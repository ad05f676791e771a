//! Session commands (init, paint, undo, redo, clear, show)

use serde::Serialize;
use std::process::ExitCode;

use crate::config::CanvasConfig;
use crate::editor::{AllowedActions, Editor};
use crate::grid::{Point, GRID_SIZE};
use crate::palette::Color;
use crate::storage::{restore_editor, save_editor, FileStore, Store};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Glyphs for `show`, one per palette index; the background prints as `.`.
const GLYPHS: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+.";

/// The persisted editor the CLI works on.
pub struct Session {
    store: FileStore,
    key: String,
}

impl Session {
    pub fn new(config: &CanvasConfig) -> Self {
        Session { store: FileStore::new(&config.storage.dir), key: config.storage.key.clone() }
    }

    pub fn exists(&self) -> bool {
        self.store.path_for(&self.key).exists()
    }

    /// Load the saved editor, or an empty one.
    pub fn load(&self) -> Editor {
        restore_editor(&self.store, &self.key)
    }

    /// Save `editor`, reporting failures on stderr.
    pub fn save(&self, editor: &Editor) -> Result<(), ExitCode> {
        save_editor(&self.store, &self.key, editor).map_err(|e| {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        })
    }

    /// Save `editor` and turn the outcome into an exit code.
    pub fn save_and_exit(&self, editor: &Editor) -> ExitCode {
        match self.save(editor) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(code) => code,
        }
    }
}

/// Execute the init command
pub fn run_init(session: &Session, force: bool) -> ExitCode {
    if session.exists() && !force {
        eprintln!(
            "Error: session already exists at {} (use --force to replace it)",
            session.store.path_for(&session.key).display()
        );
        return ExitCode::from(EXIT_ERROR);
    }
    if force {
        if let Err(e) = session.store.remove(&session.key) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }
    if let Err(code) = session.save(&Editor::empty()) {
        return code;
    }
    println!("Created session in {}", session.store.dir().display());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the paint command
pub fn run_paint(session: &Session, color: u8, size: u8, points: &[Point]) -> ExitCode {
    let color = match Color::parse(i64::from(color)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut editor = session.load();
    let result = editor.begin_edit(color).and_then(|()| {
        for point in points {
            editor.brush_points(*point, size)?;
        }
        editor.commit_edit()
    });
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let painted = editor.undo_stack().last().map_or(0, |edit| edit.len());
    if let Err(code) = session.save(&editor) {
        return code;
    }
    println!("Painted {} pixel(s) with color {}", painted, color);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the undo command
pub fn run_undo(session: &Session) -> ExitCode {
    let mut editor = session.load();
    if let Err(e) = editor.undo() {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    session.save_and_exit(&editor)
}

/// Execute the redo command
pub fn run_redo(session: &Session) -> ExitCode {
    let mut editor = session.load();
    if let Err(e) = editor.redo() {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    session.save_and_exit(&editor)
}

/// Execute the clear command
pub fn run_clear(session: &Session) -> ExitCode {
    let mut editor = session.load();
    editor.clear();
    session.save_and_exit(&editor)
}

#[derive(Serialize)]
struct ShowOutput {
    state: Vec<Vec<u8>>,
    allowed: AllowedActions,
    undo: usize,
    redo: usize,
    empty: bool,
}

/// Execute the show command
pub fn run_show(session: &Session, json: bool) -> ExitCode {
    let editor = session.load();

    if json {
        let output = ShowOutput {
            state: editor.grid().to_rows(),
            allowed: editor.allowed_actions(),
            undo: editor.undo_stack().len(),
            redo: editor.redo_stack().len(),
            empty: editor.is_empty(),
        };
        return match serde_json::to_string(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    print!("{}", render_text(&editor));
    println!(
        "undo: {}  redo: {}",
        editor.undo_stack().len(),
        editor.redo_stack().len()
    );
    ExitCode::from(EXIT_SUCCESS)
}

/// One line per row, one glyph per pixel.
fn render_text(editor: &Editor) -> String {
    let snapshot = editor.snapshot();
    let mut out = String::with_capacity((GRID_SIZE + 1) * GRID_SIZE);
    for row in snapshot.to_rows() {
        out.extend(row.iter().map(|&index| char::from(GLYPHS[usize::from(index)])));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        assert!(GLYPHS.iter().all(|g| seen.insert(*g)));
        assert_eq!(GLYPHS[usize::from(Color::BACKGROUND.index())], b'.');
    }

    #[test]
    fn test_render_text() {
        let mut editor = Editor::empty();
        editor.begin_edit(Color::BLACK).unwrap();
        editor.add_points([Point::new(1, 0).unwrap()]).unwrap();
        editor.commit_edit().unwrap();

        let text = render_text(&editor);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 64);
        assert!(lines[0].starts_with(".0.."));
        assert!(lines[1].chars().all(|c| c == '.'));
    }
}
