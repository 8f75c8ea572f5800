use super::model::AnimatedImage;

/// Largest frame width accepted by default.
pub const DEFAULT_MAX_WIDTH: u32 = 1000;
/// Largest frame height accepted by default.
pub const DEFAULT_MAX_HEIGHT: u32 = 1000;
/// Byte ceiling for sending an animation as an image (5 MiB).
pub const DEFAULT_MAX_BYTE_SIZE: u64 = 5_242_880;
/// Byte ceiling for animations that should autoplay (1 MiB).
pub const DEFAULT_AUTOPLAY_BYTE_SIZE: u64 = 1_048_576;

/// Ceilings an animation has to fit under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    pub max_width: u32,
    pub max_height: u32,
    pub max_byte_size: u64,
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_byte_size: DEFAULT_MAX_BYTE_SIZE,
        }
    }
}

/// One ceiling an animation exceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Width { frame: usize, width: u32 },
    Height { frame: usize, height: u32 },
    ByteSize { size: u64 },
}

impl SizeBudget {
    pub fn new(max_width: u32, max_height: u32, max_byte_size: u64) -> Self {
        Self {
            max_width,
            max_height,
            max_byte_size,
        }
    }

    /// Select the byte ceiling for the run: autoplay swaps in the smaller one.
    pub fn for_mode(
        autoplay: bool,
        max_width: u32,
        max_height: u32,
        max_byte_size: u64,
        autoplay_byte_size: u64,
    ) -> Self {
        let bytes = if autoplay {
            autoplay_byte_size
        } else {
            max_byte_size
        };
        Self::new(max_width, max_height, bytes)
    }

    /// Every ceiling the animation breaks, in frame order.
    pub fn violations(&self, image: &AnimatedImage, original_size: u64) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (index, frame) in image.frames.iter().enumerate() {
            if frame.width() > self.max_width {
                violations.push(Violation::Width {
                    frame: index,
                    width: frame.width(),
                });
            }
            if frame.height() > self.max_height {
                violations.push(Violation::Height {
                    frame: index,
                    height: frame.height(),
                });
            }
        }
        if original_size >= self.max_byte_size {
            violations.push(Violation::ByteSize {
                size: original_size,
            });
        }
        violations
    }
}

/// Whether an animation already fits the budget.
///
/// Fails closed: one oversized frame or an original file at or above the byte
/// ceiling rejects the image.
pub fn is_acceptable(image: &AnimatedImage, original_size: u64, budget: &SizeBudget) -> bool {
    let frames_fit = image
        .frames
        .iter()
        .all(|frame| frame.width() <= budget.max_width && frame.height() <= budget.max_height);

    frames_fit && original_size < budget.max_byte_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::model::{Frame, FrameRect};

    fn image_with_frames(sizes: &[(u32, u32)]) -> AnimatedImage {
        let frames = sizes
            .iter()
            .map(|&(w, h)| Frame::filled(FrameRect::canvas(w, h), 0))
            .collect();
        let mut image = AnimatedImage::new(0, 0, frames);
        image.recompute_canvas();
        image
    }

    #[test]
    fn test_small_image_is_acceptable() {
        let image = image_with_frames(&[(800, 600), (800, 600)]);
        assert!(is_acceptable(&image, 1_000, &SizeBudget::default()));
    }

    #[test]
    fn test_oversized_frame_rejects() {
        let image = image_with_frames(&[(800, 600), (1001, 600)]);
        assert!(!is_acceptable(&image, 1_000, &SizeBudget::default()));
    }

    #[test]
    fn test_byte_ceiling_is_exclusive() {
        let image = image_with_frames(&[(10, 10)]);
        let budget = SizeBudget::new(100, 100, 5_000);
        assert!(is_acceptable(&image, 4_999, &budget));
        assert!(!is_acceptable(&image, 5_000, &budget));
    }

    #[test]
    fn test_frame_exactly_at_ceiling_is_accepted() {
        let image = image_with_frames(&[(1000, 1000)]);
        assert!(is_acceptable(&image, 0, &SizeBudget::default()));
    }

    #[test]
    fn test_empty_image_only_checks_bytes() {
        let image = AnimatedImage::new(0, 0, Vec::new());
        assert!(is_acceptable(&image, 0, &SizeBudget::default()));
        assert!(!is_acceptable(&image, u64::MAX, &SizeBudget::default()));
    }

    #[test]
    fn test_for_mode_swaps_byte_ceiling() {
        let normal = SizeBudget::for_mode(false, 1000, 1000, 5_242_880, 1_048_576);
        let autoplay = SizeBudget::for_mode(true, 1000, 1000, 5_242_880, 1_048_576);
        assert_eq!(normal.max_byte_size, DEFAULT_MAX_BYTE_SIZE);
        assert_eq!(autoplay.max_byte_size, DEFAULT_AUTOPLAY_BYTE_SIZE);
        assert_eq!(normal.max_width, autoplay.max_width);
    }

    #[test]
    fn test_violations_lists_every_ceiling() {
        let image = image_with_frames(&[(2000, 1000), (500, 1200)]);
        let violations = SizeBudget::default().violations(&image, 10_000_000);
        assert_eq!(
            violations,
            vec![
                Violation::Width {
                    frame: 0,
                    width: 2000
                },
                Violation::Height {
                    frame: 1,
                    height: 1200
                },
                Violation::ByteSize { size: 10_000_000 },
            ]
        );
    }
}
