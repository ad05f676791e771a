//! DNA commands (dna, load-dna, tree, verify-tree)

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::dna::{boc, tree, Dna};

use super::session::Session;
use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the dna command
pub fn run_dna(session: &Session) -> ExitCode {
    println!("{}", session.load().dna());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the load-dna command
pub fn run_load_dna(session: &Session, dna: &str) -> ExitCode {
    let dna = match Dna::try_from_base64(dna) {
        Ok(dna) => dna,
        Err(e) => {
            eprintln!("Error: invalid DNA: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut editor = session.load();
    editor.load_grid(dna.to_grid());
    session.save_and_exit(&editor)
}

/// Execute the tree command
pub fn run_tree(session: &Session, dna: Option<&str>, output: Option<&Path>) -> ExitCode {
    let dna = match dna {
        Some(text) => match Dna::try_from_base64(text) {
            Ok(dna) => dna,
            Err(e) => {
                eprintln!("Error: invalid DNA: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => session.load().dna(),
    };

    let root = match tree::encode(&dna) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: cannot build payload: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let written = match output {
        Some(path) => boc::to_bytes(&root).map(|bytes| match fs::write(path, &bytes) {
            Ok(()) => {
                println!("Wrote {} ({} bytes)", path.display(), bytes.len());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: Cannot write '{}': {}", path.display(), e);
                ExitCode::from(EXIT_ERROR)
            }
        }),
        None => boc::to_base64(&root).map(|text| {
            println!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }),
    };
    written.unwrap_or_else(|e| {
        eprintln!("Error: cannot serialize payload: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Execute the verify-tree command
pub fn run_verify_tree(payload: Option<&str>, file: Option<&Path>) -> ExitCode {
    let parsed = match (payload, file) {
        (_, Some(path)) => match fs::read(path) {
            Ok(bytes) => boc::from_bytes(&bytes),
            Err(e) => {
                eprintln!("Error: Cannot read '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        (Some(text), None) => boc::from_base64(text),
        (None, None) => {
            eprintln!("Error: no payload given");
            return ExitCode::from(super::EXIT_INVALID_ARGS);
        }
    };

    let root = match parsed {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: malformed payload: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match tree::decode(&root) {
        Ok(dna) => {
            println!("{}", dna);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {} ({})", e, e.rule());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
