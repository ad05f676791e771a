//! Image file commands (import, export)

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::import::{ImportError, ImportResponse};
use crate::render::render_png;

use super::session::Session;
use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the import command
pub fn run_import(session: &Session, input: &Path, json: bool) -> ExitCode {
    let bytes = match fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let mut editor = session.load();
    let result = editor.load_from_image(extension, &bytes);

    if json {
        let response = ImportResponse::from(result.map(|()| editor.grid().clone()));
        match serde_json::to_string(&response) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    match result {
        Ok(()) => {
            if let Err(code) = session.save(&editor) {
                return code;
            }
            if !json {
                println!("Imported {}", input.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            report_import_error(input, e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn report_import_error(input: &Path, error: ImportError) {
    eprintln!("Error: Cannot import '{}': {} [{}]", input.display(), error, error.status());
}

/// Execute the export command
pub fn run_export(session: &Session, output: &Path, upscale: bool, factor: u32) -> ExitCode {
    let editor = session.load();
    let scale = if upscale { factor } else { 1 };

    let bytes = match render_png(editor.grid(), scale) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error: Cannot create '{}': {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    if let Err(e) = fs::write(output, &bytes) {
        eprintln!("Error: Cannot write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let size = 64 * scale;
    println!("Saved {} ({}x{})", output.display(), size, size);
    ExitCode::from(EXIT_SUCCESS)
}
