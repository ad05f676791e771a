//! Pixel Canvas - model of a 64x64 palette pixel-art editor
//!
//! This library provides:
//! - A dense palette grid with immutable snapshots for renderers
//! - An edit engine with strokes, undo and redo
//! - The canonical DNA encoding of a grid and its on-chain bit-tree layout
//! - A persistence document with debounced background saving
//! - Image import and PNG export

pub mod backup;
pub mod brush;
pub mod cli;
pub mod config;
pub mod dna;
pub mod editor;
pub mod envelope;
pub mod grid;
pub mod import;
pub mod observer;
pub mod palette;
pub mod render;
pub mod storage;
