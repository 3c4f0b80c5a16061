//! Image crop utility — rasterizes a displayed-pixel crop region into a
//! PNG file at the image's natural resolution.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

/// Fixed crop aspect ratio (square).
pub const CROP_ASPECT: f32 = 1.0;

/// Fraction of the displayed width covered by the initial centered crop.
pub const INITIAL_CROP_FRACTION: f32 = 0.9;

/// Maximum displayed height; larger images are presented scaled down and
/// crop regions arrive in these displayed-pixel units.
pub const MAX_DISPLAY_HEIGHT: u32 = 400;

/// A crop rectangle in displayed-pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    /// Coerce non-finite or negative components to zero. A zero-area
    /// result makes [`crop_to_png`] return `None` instead of erroring.
    pub fn sanitized(self) -> CropRect {
        fn coerce(v: f32) -> f32 {
            if v.is_finite() && v > 0.0 { v } else { 0.0 }
        }
        CropRect {
            x: coerce(self.x),
            y: coerce(self.y),
            width: coerce(self.width),
            height: coerce(self.height),
        }
    }
}

/// A cropped image serialized to PNG, ready for upload.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Displayed dimensions for an image: natural size scaled (down only) to
/// fit [`MAX_DISPLAY_HEIGHT`], aspect preserved.
pub fn display_size(natural_width: u32, natural_height: u32) -> (u32, u32) {
    if natural_height <= MAX_DISPLAY_HEIGHT {
        return (natural_width, natural_height);
    }
    let scale = MAX_DISPLAY_HEIGHT as f64 / natural_height as f64;
    let width = ((natural_width as f64) * scale).round() as u32;
    (width.max(1), MAX_DISPLAY_HEIGHT)
}

/// The initial centered crop region for a freshly loaded image:
/// [`INITIAL_CROP_FRACTION`] of the displayed width at the fixed aspect,
/// shrunk if needed to fit, centered both ways.
pub fn centered_crop(display_width: u32, display_height: u32) -> CropRect {
    let mut width = display_width as f32 * INITIAL_CROP_FRACTION;
    let mut height = width / CROP_ASPECT;
    if height > display_height as f32 {
        height = display_height as f32;
        width = height * CROP_ASPECT;
    }
    CropRect {
        x: (display_width as f32 - width) / 2.0,
        y: (display_height as f32 - height) / 2.0,
        width,
        height,
    }
}

/// Rasterize `crop` (displayed-pixel units) from `source` into a PNG named
/// `file_name`.
///
/// The scale factor between natural and displayed dimensions is applied
/// per axis, the scaled rectangle is clamped to the image bounds, and the
/// result is encoded as PNG. Returns `None` when the sanitized region is
/// empty or the encode fails.
pub fn crop_to_png(
    source: &DynamicImage,
    display: (u32, u32),
    crop: CropRect,
    file_name: &str,
) -> Option<CroppedImage> {
    let crop = crop.sanitized();
    let (display_width, display_height) = display;
    if display_width == 0 || display_height == 0 {
        return None;
    }

    let (natural_width, natural_height) = source.dimensions();
    let scale_x = natural_width as f64 / display_width as f64;
    let scale_y = natural_height as f64 / display_height as f64;

    let x = ((crop.x as f64 * scale_x).round() as u32).min(natural_width);
    let y = ((crop.y as f64 * scale_y).round() as u32).min(natural_height);
    let width = ((crop.width as f64 * scale_x).round() as u32).min(natural_width - x);
    let height = ((crop.height as f64 * scale_y).round() as u32).min(natural_height - y);
    if width == 0 || height == 0 {
        return None;
    }

    let cropped = source.crop_imm(x, y, width, height);
    let mut bytes = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .ok()?;

    Some(CroppedImage {
        file_name: file_name.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> DynamicImage {
        let mut img = image::RgbImage::new(width, height);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            // Left half red, right half blue, so crops are distinguishable.
            *pixel = if x < width / 2 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            };
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn display_size_caps_height_at_400() {
        assert_eq!(display_size(800, 400), (800, 400));
        assert_eq!(display_size(800, 800), (400, 400));
        assert_eq!(display_size(1600, 800), (800, 400));
        assert_eq!(display_size(100, 50), (100, 50));
    }

    #[test]
    fn centered_crop_is_square_and_centered() {
        let crop = centered_crop(400, 400);
        assert!((crop.width - 360.0).abs() < f32::EPSILON);
        assert!((crop.height - 360.0).abs() < f32::EPSILON);
        assert!((crop.x - 20.0).abs() < f32::EPSILON);
        assert!((crop.y - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn centered_crop_shrinks_to_fit_short_images() {
        let crop = centered_crop(400, 100);
        assert!((crop.height - 100.0).abs() < f32::EPSILON);
        assert!((crop.width - 100.0).abs() < f32::EPSILON);
        assert!((crop.y - 0.0).abs() < f32::EPSILON);
        assert!((crop.x - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn crop_scales_displayed_units_to_natural_pixels() {
        // Natural 800x800 displayed at 400x400 → scale factor 2.
        let source = test_image(800, 800);
        let crop = CropRect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let result = crop_to_png(&source, (400, 400), crop, "avatar.png").unwrap();
        assert_eq!(result.file_name, "avatar.png");

        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (200, 200));
        // Top-left quadrant of the source is red.
        let pixel = decoded.to_rgb8().get_pixel(10, 10).0;
        assert_eq!(pixel, [255, 0, 0]);
    }

    #[test]
    fn crop_region_is_clamped_to_image_bounds() {
        let source = test_image(200, 100);
        let crop = CropRect {
            x: 150.0,
            y: 50.0,
            width: 500.0,
            height: 500.0,
        };
        let result = crop_to_png(&source, (200, 100), crop, "clamped.png").unwrap();
        let decoded = image::load_from_memory(&result.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (50, 50));
        // Right half of the source is blue.
        let pixel = decoded.to_rgb8().get_pixel(5, 5).0;
        assert_eq!(pixel, [0, 0, 255]);
    }

    #[test]
    fn non_finite_fields_coerce_to_zero() {
        let rect = CropRect {
            x: f32::NAN,
            y: f32::NEG_INFINITY,
            width: -5.0,
            height: 40.0,
        }
        .sanitized();
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn empty_region_returns_none() {
        let source = test_image(100, 100);
        let crop = CropRect {
            x: 10.0,
            y: 10.0,
            width: f32::NAN,
            height: 50.0,
        };
        assert!(crop_to_png(&source, (100, 100), crop, "none.png").is_none());

        let zero = CropRect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        };
        assert!(crop_to_png(&source, (100, 100), zero, "zero.png").is_none());
    }

    #[test]
    fn output_is_png_regardless_of_source_format() {
        let source = test_image(64, 64);
        let crop = CropRect {
            x: 0.0,
            y: 0.0,
            width: 64.0,
            height: 64.0,
        };
        let result = crop_to_png(&source, (64, 64), crop, "photo.jpg").unwrap();
        // PNG magic bytes.
        assert_eq!(&result.bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
