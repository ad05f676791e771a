//! Palette listing

use serde::Serialize;
use std::process::ExitCode;

use crate::palette::Color;

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Serialize)]
struct PaletteEntry {
    index: u8,
    hex: String,
}

/// Execute the palette command
pub fn run_palette(json: bool) -> ExitCode {
    let entries: Vec<PaletteEntry> = Color::palette()
        .map(|color| PaletteEntry { index: color.index(), hex: color.to_hex() })
        .collect();

    if json {
        return match serde_json::to_string_pretty(&entries) {
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

    println!("Palette ({} colors):", entries.len());
    for entry in &entries {
        let note = match entry.index {
            i if i == Color::BLACK.index() => "  black",
            i if i == Color::BACKGROUND.index() => "  white, background",
            _ => "",
        };
        println!("  {:2}  {}{}", entry.index, entry.hex, note);
    }
    ExitCode::from(EXIT_SUCCESS)
}
