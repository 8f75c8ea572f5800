//! Conversion between encoded GIF bytes and [`AnimatedImage`].
use std::borrow::Cow;
use std::path::PathBuf;

use gif::{ColorOutput, DecodeOptions, DisposalMethod, Encoder, Repeat};

use crate::error::FitError;
use crate::image_processing::model::{AnimatedImage, Disposal, Frame, FrameRect, LoopCount, Palette};

/// Decodes and encodes animations.
///
/// The length of [`Codec::encode`]'s output is the authoritative byte size
/// of a fitted image.
pub trait Codec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AnimatedImage, FitError>;
    fn encode(&self, image: &AnimatedImage) -> Result<Vec<u8>, FitError>;
}

/// [`Codec`] backed by the `gif` crate, keeping frames indexed end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifCodec;

impl GifCodec {
    pub fn new() -> Self {
        Self
    }
}

fn decode_error(err: impl std::fmt::Display) -> FitError {
    // The engine attaches the record path.
    FitError::decode(PathBuf::new(), err.to_string())
}

impl From<DisposalMethod> for Disposal {
    fn from(method: DisposalMethod) -> Self {
        match method {
            DisposalMethod::Any => Disposal::Any,
            DisposalMethod::Keep => Disposal::Keep,
            DisposalMethod::Background => Disposal::Background,
            DisposalMethod::Previous => Disposal::Previous,
        }
    }
}

impl From<Disposal> for DisposalMethod {
    fn from(disposal: Disposal) -> Self {
        match disposal {
            Disposal::Any => DisposalMethod::Any,
            Disposal::Keep => DisposalMethod::Keep,
            Disposal::Background => DisposalMethod::Background,
            Disposal::Previous => DisposalMethod::Previous,
        }
    }
}

impl Codec for GifCodec {
    fn decode(&self, bytes: &[u8]) -> Result<AnimatedImage, FitError> {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::Indexed);
        let mut decoder = options.read_info(bytes).map_err(decode_error)?;

        let global_palette = decoder.global_palette().map(Palette::from_rgb_bytes);
        let background_index = decoder.bg_color().map(|index| index as u8).unwrap_or(0);
        let width = decoder.width() as u32;
        let height = decoder.height() as u32;

        let mut frames = Vec::new();
        while let Some(frame) = decoder.read_next_frame().map_err(decode_error)? {
            let rect = FrameRect::new(
                frame.left as u32,
                frame.top as u32,
                frame.width as u32,
                frame.height as u32,
            );
            if frame.buffer.len() != rect.area() {
                return Err(decode_error(format!(
                    "frame {} has {} pixels, expected {}",
                    frames.len(),
                    frame.buffer.len(),
                    rect.area()
                )));
            }
            frames.push(Frame {
                pixels: frame.buffer.to_vec(),
                palette: frame.palette.as_deref().map(Palette::from_rgb_bytes),
                transparent: frame.transparent,
                rect,
                delay: frame.delay,
                disposal: frame.dispose.into(),
                interlaced: frame.interlaced,
            });
        }

        if frames.is_empty() {
            return Err(decode_error("no frames"));
        }

        // Loop extension is read while walking the frames.
        let loop_count = match decoder.repeat() {
            Repeat::Infinite => LoopCount::Infinite,
            Repeat::Finite(count) => LoopCount::Finite(count),
        };

        Ok(AnimatedImage {
            width,
            height,
            global_palette,
            background_index,
            loop_count,
            frames,
        })
    }

    fn encode(&self, image: &AnimatedImage) -> Result<Vec<u8>, FitError> {
        let to_u16 = |value: u32, what: &str| {
            u16::try_from(value).map_err(|_| FitError::encode(format!("{} {} exceeds the GIF limit", what, value)))
        };

        let global = image
            .global_palette
            .as_ref()
            .map(Palette::to_rgb_bytes)
            .unwrap_or_default();

        let mut bytes = Vec::new();
        {
            let mut encoder = Encoder::new(
                &mut bytes,
                to_u16(image.width, "canvas width")?,
                to_u16(image.height, "canvas height")?,
                &global,
            )
            .map_err(|e| FitError::encode(e.to_string()))?;

            // Finite(0) means "play once", which is the absence of the extension.
            let repeat = match image.loop_count {
                LoopCount::Infinite => Some(Repeat::Infinite),
                LoopCount::Finite(0) => None,
                LoopCount::Finite(count) => Some(Repeat::Finite(count)),
            };
            if let Some(repeat) = repeat {
                encoder
                    .set_repeat(repeat)
                    .map_err(|e| FitError::encode(e.to_string()))?;
            }

            for (index, frame) in image.frames.iter().enumerate() {
                if frame.palette.is_none() && image.global_palette.is_none() {
                    return Err(FitError::encode(format!("frame {} has no colour table", index)));
                }
                let gif_frame = gif::Frame {
                    left: to_u16(frame.rect.left, "frame left")?,
                    top: to_u16(frame.rect.top, "frame top")?,
                    width: to_u16(frame.rect.width, "frame width")?,
                    height: to_u16(frame.rect.height, "frame height")?,
                    delay: frame.delay,
                    dispose: frame.disposal.into(),
                    transparent: frame.transparent,
                    interlaced: frame.interlaced,
                    palette: frame.palette.as_ref().map(Palette::to_rgb_bytes),
                    buffer: Cow::Borrowed(&frame.pixels),
                    ..gif::Frame::default()
                };
                encoder
                    .write_frame(&gif_frame)
                    .map_err(|e| FitError::encode(format!("frame {}: {}", index, e)))?;
            }
        }

        Ok(bytes)
    }
}
