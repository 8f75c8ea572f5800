use super::model::Palette;

const RED_LEVELS: u32 = 6;
const GREEN_LEVELS: u32 = 7;
const BLUE_LEVELS: u32 = 6;

/// Palette used for frames that carry no colour table of their own and live
/// in an image without a global one.
///
/// A 6×7×6 RGB cube (green gets the extra level) followed by one reserved
/// transparent slot. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPalette {
    palette: Palette,
    transparent: u8,
}

impl FallbackPalette {
    pub fn new() -> Self {
        let mut colors = Vec::with_capacity((RED_LEVELS * GREEN_LEVELS * BLUE_LEVELS + 1) as usize);
        for r in 0..RED_LEVELS {
            for g in 0..GREEN_LEVELS {
                for b in 0..BLUE_LEVELS {
                    colors.push([level(r, RED_LEVELS), level(g, GREEN_LEVELS), level(b, BLUE_LEVELS)]);
                }
            }
        }
        let transparent = colors.len() as u8;
        colors.push([0, 0, 0]);

        Self {
            palette: Palette::new(colors),
            transparent,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn transparent_index(&self) -> u8 {
        self.transparent
    }
}

impl Default for FallbackPalette {
    fn default() -> Self {
        Self::new()
    }
}

fn level(step: u32, levels: u32) -> u8 {
    ((step * 255 + (levels - 1) / 2) / (levels - 1)) as u8
}
