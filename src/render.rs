//! PNG export of a grid

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, Rgb, RgbImage};
use thiserror::Error;

use crate::dna::Dna;
use crate::grid::{Grid, Point, GRID_SIZE};

/// Largest accepted upscale factor.
pub const MAX_UPSCALE: u32 = 64;

/// Error type for rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("upscale factor {0} is outside 1..={max}", max = MAX_UPSCALE)]
    InvalidScale(u32),
    #[error("invalid DNA")]
    InvalidDna,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Rasterize a grid at one pixel per cell.
pub fn render_image(grid: &Grid) -> RgbImage {
    let size = GRID_SIZE as u32;
    let mut image = RgbImage::new(size, size);
    for point in Point::all() {
        let color = grid.get(point);
        image.put_pixel(u32::from(point.x()), u32::from(point.y()), Rgb(color.rgb()));
    }
    image
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This keeps each grid cell a crisp square.
pub fn scale_image(image: RgbImage, factor: u32) -> RgbImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Encode a grid as PNG, `upscale` output pixels per cell.
pub fn render_png(grid: &Grid, upscale: u32) -> Result<Vec<u8>, RenderError> {
    if !(1..=MAX_UPSCALE).contains(&upscale) {
        return Err(RenderError::InvalidScale(upscale));
    }
    let image = scale_image(render_image(grid), upscale);
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Decode a DNA string and encode it as PNG.
pub fn render_dna(dna: &str, upscale: u32) -> Result<Vec<u8>, RenderError> {
    let grid = Dna::from_base64(dna).ok_or(RenderError::InvalidDna)?.to_grid();
    render_png(&grid, upscale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new();
        grid.set(Point::new(0, 0).unwrap(), Color::BLACK);
        grid.set(Point::new(63, 1).unwrap(), Color::parse(48).unwrap());
        grid
    }

    #[test]
    fn test_render_image_pixels() {
        let image = render_image(&sample_grid());
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(63, 1), &Rgb([0xFF, 0, 0]));
        assert_eq!(image.get_pixel(5, 5), &Rgb([0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_scale_image() {
        let scaled = scale_image(render_image(&sample_grid()), 10);
        assert_eq!(scaled.dimensions(), (640, 640));
        assert_eq!(scaled.get_pixel(9, 9), &Rgb([0, 0, 0]));
        assert_eq!(scaled.get_pixel(10, 10), &Rgb([0xFF, 0xFF, 0xFF]));
        assert_eq!(scaled.get_pixel(639, 19), &Rgb([0xFF, 0, 0]));
    }

    #[test]
    fn test_render_png_decodes() {
        let grid = sample_grid();
        let bytes = render_png(&grid, 1).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, render_image(&grid));

        let bytes = render_png(&grid, 10).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (640, 640));
    }

    #[test]
    fn test_render_png_imports_back() {
        let grid = sample_grid();
        let bytes = render_png(&grid, 1).unwrap();
        assert_eq!(crate::import::parse_image("png", &bytes), Ok(grid));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(render_png(&Grid::new(), 0), Err(RenderError::InvalidScale(0))));
        assert!(matches!(render_png(&Grid::new(), 65), Err(RenderError::InvalidScale(65))));
    }

    #[test]
    fn test_render_dna() {
        let grid = sample_grid();
        let bytes = render_dna(&Dna::from_grid(&grid).to_base64(), 2).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (128, 128));
        assert!(matches!(render_dna("nope", 1), Err(RenderError::InvalidDna)));
    }
}
