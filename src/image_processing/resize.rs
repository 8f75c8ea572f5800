use anyhow::{Context, Result};
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{Rgba, RgbaImage};

use super::model::{Frame, Palette};

/// Resampling filter applied to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    /// Lanczos3 convolution, used for frames that came in full-canvas.
    Quality,
    /// Nearest neighbour, used for frames that were just padded to the canvas
    /// so the hard edge of the added transparent border stays hard.
    Edge,
}

impl ResampleFilter {
    fn algorithm(self) -> ResizeAlg {
        match self {
            Self::Quality => ResizeAlg::Convolution(FilterType::Lanczos3),
            Self::Edge => ResizeAlg::Nearest,
        }
    }
}

/// Uniform scale factor that fits the canvas inside `target_width × target_height`.
///
/// Never above 1.0: frames are only ever shrunk.
pub fn scale_to_fit(canvas_width: u32, canvas_height: u32, target_width: u32, target_height: u32) -> f64 {
    if canvas_width == 0 || canvas_height == 0 {
        return 1.0;
    }
    let horizontal = target_width as f64 / canvas_width as f64;
    let vertical = target_height as f64 / canvas_height as f64;
    horizontal.min(vertical).min(1.0)
}

/// Dimensions of a `width × height` raster after applying `scale`.
///
/// Rounded to the nearest pixel, never below one pixel and never above the
/// source size.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_axis = |size: u32| -> u32 {
        if size == 0 {
            return 0;
        }
        ((size as f64 * scale).round() as u32).clamp(1, size)
    };
    (scale_axis(width), scale_axis(height))
}

/// Expand an indexed frame to RGBA; the transparent index becomes alpha 0.
pub fn frame_to_rgba(frame: &Frame, palette: Option<&Palette>) -> RgbaImage {
    let width = frame.width();
    let height = frame.height();
    RgbaImage::from_fn(width, height, |x, y| {
        let index = frame.index_at(x, y);
        if Some(index) == frame.transparent {
            return Rgba([0, 0, 0, 0]);
        }
        let [r, g, b] = palette.and_then(|p| p.get(index)).unwrap_or([0, 0, 0]);
        Rgba([r, g, b, 255])
    })
}

/// Resize a truecolor raster to exact dimensions.
pub fn resample(img: &RgbaImage, width: u32, height: u32, filter: ResampleFilter) -> Result<RgbaImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }
    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return Ok(RgbaImage::new(width, height));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
        .context("Failed to wrap source frame for resizing")?;
    let mut dst_image = Image::new(width, height, PixelType::U8x4);

    // Alpha is premultiplied during convolution so transparent pixels do not
    // bleed black into their neighbours.
    let options = ResizeOptions::new()
        .resize_alg(filter.algorithm())
        .use_alpha(true);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .with_context(|| format!("Failed to resize frame {}x{} -> {}x{}", src_width, src_height, width, height))?;

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::model::FrameRect;

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_scale_to_fit_uses_tighter_axis() {
        assert!((scale_to_fit(2000, 1000, 1000, 1000) - 0.5).abs() < 1e-9);
        assert!((scale_to_fit(1000, 2000, 1000, 1000) - 0.5).abs() < 1e-9);
        assert!((scale_to_fit(2000, 1000, 1000, 578) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_scale_to_fit_never_upscales() {
        assert_eq!(scale_to_fit(100, 50, 1000, 1000), 1.0);
        assert_eq!(scale_to_fit(0, 50, 10, 10), 1.0);
    }

    #[test]
    fn test_scaled_dimensions_rounding_and_bounds() {
        assert_eq!(scaled_dimensions(2000, 1000, 0.5), (1000, 500));
        assert_eq!(scaled_dimensions(3, 3, 0.01), (1, 1));
        assert_eq!(scaled_dimensions(10, 10, 1.0), (10, 10));
        assert_eq!(scaled_dimensions(0, 10, 0.5), (0, 5));
    }

    #[test]
    fn test_frame_to_rgba_honours_transparency() {
        let mut frame = Frame::filled(FrameRect::canvas(2, 1), 0);
        frame.pixels = vec![0, 1];
        frame.transparent = Some(1);
        let palette = Palette::new(vec![[10, 20, 30], [40, 50, 60]]);

        let rgba = frame_to_rgba(&frame, Some(&palette));
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_resample_quality() {
        let img = create_test_image(100, 80);
        let resized = resample(&img, 50, 40, ResampleFilter::Quality).unwrap();
        assert_eq!(resized.dimensions(), (50, 40));
    }

    #[test]
    fn test_resample_edge_keeps_hard_edges() {
        // Left half opaque red, right half fully transparent.
        let img = RgbaImage::from_fn(40, 20, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let resized = resample(&img, 20, 10, ResampleFilter::Edge).unwrap();
        for pixel in resized.pixels() {
            assert!(pixel[3] == 0 || pixel[3] == 255, "alpha {} is not hard", pixel[3]);
        }
        assert_eq!(resized.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(resized.get_pixel(19, 9)[3], 0);
    }

    #[test]
    fn test_resample_same_size_is_copy() {
        let img = create_test_image(7, 5);
        let resized = resample(&img, 7, 5, ResampleFilter::Quality).unwrap();
        assert_eq!(resized, img);
    }
}
