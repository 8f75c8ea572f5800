//! Truecolor → indexed conversion with error diffusion.
//!
//! Every kernel below diffuses the quantization error of the current pixel to
//! neighbours that have not been visited yet (right and below).
use std::collections::HashMap;

use clap::ValueEnum;
use image::RgbaImage;

use super::model::{Frame, FrameRect, Palette};
use super::palette::FallbackPalette;

/// Pixels with alpha below this are written as the transparent index.
pub const ALPHA_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DitherMethod {
    /// Floyd-Steinberg (best for gradients)
    #[default]
    #[value(name = "floyd-steinberg")]
    FloydSteinberg,
    /// Atkinson (lighter, preserves brightness)
    #[value(name = "atkinson")]
    Atkinson,
    /// Stucki (wide diffusion, fewer patterns)
    #[value(name = "stucki")]
    Stucki,
    /// Jarvis-Judice-Ninke (very diffused)
    #[value(name = "jarvis")]
    JarvisJudiceNinke,
    /// Nearest colour only, no diffusion
    #[value(name = "none")]
    None,
}

/// `(dx, dy, weight)` taps of an error-diffusion matrix.
struct Kernel {
    divisor: f32,
    taps: &'static [(i32, i32, f32)],
}

//     * 7
// 3 5 1      (/16)
const FLOYD_STEINBERG: Kernel = Kernel {
    divisor: 16.0,
    taps: &[(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)],
};

// Only 6/8 of the error is diffused.
const ATKINSON: Kernel = Kernel {
    divisor: 8.0,
    taps: &[
        (1, 0, 1.0),
        (2, 0, 1.0),
        (-1, 1, 1.0),
        (0, 1, 1.0),
        (1, 1, 1.0),
        (0, 2, 1.0),
    ],
};

const STUCKI: Kernel = Kernel {
    divisor: 42.0,
    taps: &[
        (1, 0, 8.0),
        (2, 0, 4.0),
        (-2, 1, 2.0),
        (-1, 1, 4.0),
        (0, 1, 8.0),
        (1, 1, 4.0),
        (2, 1, 2.0),
        (-2, 2, 1.0),
        (-1, 2, 2.0),
        (0, 2, 4.0),
        (1, 2, 2.0),
        (2, 2, 1.0),
    ],
};

const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    divisor: 48.0,
    taps: &[
        (1, 0, 7.0),
        (2, 0, 5.0),
        (-2, 1, 3.0),
        (-1, 1, 5.0),
        (0, 1, 7.0),
        (1, 1, 5.0),
        (2, 1, 3.0),
        (-2, 2, 1.0),
        (-1, 2, 3.0),
        (0, 2, 5.0),
        (1, 2, 3.0),
        (2, 2, 1.0),
    ],
};

impl DitherMethod {
    fn kernel(self) -> Option<&'static Kernel> {
        match self {
            Self::FloydSteinberg => Some(&FLOYD_STEINBERG),
            Self::Atkinson => Some(&ATKINSON),
            Self::Stucki => Some(&STUCKI),
            Self::JarvisJudiceNinke => Some(&JARVIS_JUDICE_NINKE),
            Self::None => None,
        }
    }
}

/// A palette to quantize against together with its transparent slot.
#[derive(Debug, Clone, Copy)]
pub struct PaletteChoice<'a> {
    pub palette: &'a Palette,
    pub transparent: Option<u8>,
}

/// Convert a truecolor raster back to an indexed frame.
///
/// Uses `preferred` when the frame brought its own palette, the process-wide
/// fallback otherwise. The returned frame covers `(0, 0)-(w, h)` and carries
/// the palette it was quantized against.
pub fn quantize(
    raster: &RgbaImage,
    preferred: Option<PaletteChoice<'_>>,
    fallback: &FallbackPalette,
    dither: DitherMethod,
) -> Frame {
    let choice = preferred.unwrap_or(PaletteChoice {
        palette: fallback.palette(),
        transparent: Some(fallback.transparent_index()),
    });

    let (width, height) = raster.dimensions();
    let mut frame = Frame::filled(FrameRect::canvas(width, height), choice.transparent.unwrap_or(0));
    frame.palette = Some(choice.palette.clone());
    frame.transparent = choice.transparent;

    if choice.palette.is_empty() {
        return frame;
    }

    let mut matcher = NearestColor::new(choice.palette, choice.transparent);
    let kernel = dither.kernel();

    // Working buffer holding the colour plus the error accumulated so far.
    let mut working: Vec<[f32; 3]> = raster
        .pixels()
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();

    for y in 0..height {
        for x in 0..width {
            let offset = (y * width + x) as usize;
            let alpha = raster.get_pixel(x, y)[3];

            if alpha < ALPHA_THRESHOLD {
                if let Some(transparent) = choice.transparent {
                    frame.pixels[offset] = transparent;
                    continue;
                }
            }

            let current = working[offset].map(|c| c.clamp(0.0, 255.0));
            let target = [current[0] as u8, current[1] as u8, current[2] as u8];
            let (index, color) = matcher.find(target);
            frame.pixels[offset] = index;

            let Some(kernel) = kernel else {
                continue;
            };

            let error = [
                current[0] - color[0] as f32,
                current[1] - color[1] as f32,
                current[2] - color[2] as f32,
            ];
            for &(dx, dy, weight) in kernel.taps {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                let factor = weight / kernel.divisor;
                let neighbour = &mut working[(ny as u32 * width + nx as u32) as usize];
                for channel in 0..3 {
                    neighbour[channel] += error[channel] * factor;
                }
            }
        }
    }

    frame
}

/// Perceptually weighted squared distance (30% red, 59% green, 11% blue).
fn weighted_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr * 30 + dg * dg * 59 + db * db * 11) as u32
}

/// Index of the palette colour closest to `color`, skipping `exclude`.
pub fn nearest_index(color: [u8; 3], palette: &Palette, exclude: Option<u8>) -> Option<u8> {
    palette
        .colors()
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index as u8) != exclude)
        .min_by_key(|(_, candidate)| weighted_distance(color, **candidate))
        .map(|(index, _)| index as u8)
}

/// Memoizing nearest-colour lookup for one quantization pass.
struct NearestColor<'a> {
    palette: &'a Palette,
    transparent: Option<u8>,
    cache: HashMap<[u8; 3], (u8, [u8; 3])>,
}

impl<'a> NearestColor<'a> {
    fn new(palette: &'a Palette, transparent: Option<u8>) -> Self {
        Self {
            palette,
            transparent,
            cache: HashMap::new(),
        }
    }

    fn find(&mut self, color: [u8; 3]) -> (u8, [u8; 3]) {
        if let Some(hit) = self.cache.get(&color) {
            return *hit;
        }
        // A palette made only of the transparent slot still has to yield something.
        let index = nearest_index(color, self.palette, self.transparent)
            .or_else(|| nearest_index(color, self.palette, None))
            .unwrap_or(0);
        let found = (index, self.palette.get(index).unwrap_or([0, 0, 0]));
        self.cache.insert(color, found);
        found
    }
}
