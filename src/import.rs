//! Image import: raster file bytes to a palette grid
//!
//! Accepts PNG, JPEG and BMP. The image must be exactly 64x64 and every
//! pixel must be an exact palette color; anything else is reported as
//! one of four failure kinds, each with a stable status tag for the UI.

use image::ImageFormat;
use serde::Serialize;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;

use crate::grid::{Grid, Point, GRID_SIZE};
use crate::palette::Color;

/// Why an image could not be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("unsupported image extension")]
    UnsupportedExtension,
    #[error("image could not be decoded")]
    DecodeError,
    #[error("image is {width}x{height}, expected 64x64")]
    WrongDimensions { width: u32, height: u32 },
    #[error("pixel ({x}, {y}) is not a palette color")]
    WrongPalette { x: u8, y: u8 },
}

impl ImportError {
    /// Status tag shown to the user.
    pub fn status(&self) -> &'static str {
        match self {
            ImportError::UnsupportedExtension => "unsupported_extension",
            ImportError::DecodeError => "decode_error",
            ImportError::WrongDimensions { .. } => "wrong_dimensions",
            ImportError::WrongPalette { .. } => "wrong_palette",
        }
    }
}

/// File types the importer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Jpeg,
    Bmp,
}

impl ImageExtension {
    fn format(self) -> ImageFormat {
        match self {
            ImageExtension::Png => ImageFormat::Png,
            ImageExtension::Jpeg => ImageFormat::Jpeg,
            ImageExtension::Bmp => ImageFormat::Bmp,
        }
    }
}

impl FromStr for ImageExtension {
    type Err = ImportError;

    /// Case-insensitive, with or without the leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(ImageExtension::Png),
            "jpg" | "jpeg" => Ok(ImageExtension::Jpeg),
            "bmp" => Ok(ImageExtension::Bmp),
            _ => Err(ImportError::UnsupportedExtension),
        }
    }
}

/// Import result in the shape the front end consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportResponse {
    Ok { data: Vec<Vec<u8>> },
    UnsupportedExtension,
    DecodeError,
    WrongDimensions,
    WrongPalette,
}

impl From<Result<Grid, ImportError>> for ImportResponse {
    fn from(result: Result<Grid, ImportError>) -> Self {
        match result {
            Ok(grid) => ImportResponse::Ok { data: grid.to_rows() },
            Err(ImportError::UnsupportedExtension) => ImportResponse::UnsupportedExtension,
            Err(ImportError::DecodeError) => ImportResponse::DecodeError,
            Err(ImportError::WrongDimensions { .. }) => ImportResponse::WrongDimensions,
            Err(ImportError::WrongPalette { .. }) => ImportResponse::WrongPalette,
        }
    }
}

/// Decode an image file into a grid.
///
/// Dimensions are checked from the header before the pixel data is
/// decoded, so a wrongly sized image is reported as such even if its
/// body is damaged.
pub fn parse_image(extension: &str, bytes: &[u8]) -> Result<Grid, ImportError> {
    let format = extension.parse::<ImageExtension>()?.format();

    let (width, height) = image::io::Reader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|_| ImportError::DecodeError)?;
    if width != GRID_SIZE as u32 || height != GRID_SIZE as u32 {
        return Err(ImportError::WrongDimensions { width, height });
    }

    let rgb = image::load_from_memory_with_format(bytes, format)
        .map_err(|_| ImportError::DecodeError)?
        .to_rgb8();

    let mut grid = Grid::new();
    for point in Point::all() {
        let pixel = rgb.get_pixel(u32::from(point.x()), u32::from(point.y()));
        let color = Color::from_rgb(pixel.0)
            .ok_or(ImportError::WrongPalette { x: point.x(), y: point.y() })?;
        grid.set(point, color);
    }
    Ok(grid)
}
