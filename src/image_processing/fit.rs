use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::borrow::Cow;
use std::sync::Arc;

use super::align::align_to_canvas;
use super::constraints::SizeBudget;
use super::model::{AnimatedImage, Frame, Palette};
use super::palette::FallbackPalette;
use super::quantize::{quantize, DitherMethod, PaletteChoice};
use super::resize::{frame_to_rgba, resample, scale_to_fit, scaled_dimensions, ResampleFilter};
use crate::error::FitError;

pub const DEFAULT_SAFETY_MARGIN: f64 = 0.8;
pub const DEFAULT_MIN_RATIO: f64 = 0.3;
pub const DEFAULT_MIN_DIMENSION: u32 = 64;

/// Tuning knobs of the size search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Multiplier applied to the area estimate so the re-encoded file lands
    /// under the budget despite palette and compression overhead.
    pub safety_margin: f64,
    /// Lower bound of the area ratio.
    pub min_ratio: f64,
    /// Lower bound of each target axis, in pixels.
    pub min_dimension: u32,
    pub dither: DitherMethod,
    /// Extra encode/measure/shrink rounds after the first estimate. 0 keeps
    /// the single-pass behaviour.
    pub max_refinements: u32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            min_ratio: DEFAULT_MIN_RATIO,
            min_dimension: DEFAULT_MIN_DIMENSION,
            dither: DitherMethod::default(),
            max_refinements: 0,
        }
    }
}

/// Linear shrink factor expected to bring `original_size` under `max_byte_size`.
///
/// Byte size grows roughly with pixel area, so the factor per axis is the
/// square root of the byte ratio. `None` when the file is already small enough.
pub fn compute_area_ratio(original_size: u64, max_byte_size: u64, safety_margin: f64, min_ratio: f64) -> Option<f64> {
    if original_size <= max_byte_size {
        return None;
    }
    let ratio = (max_byte_size as f64 / original_size as f64).sqrt() * safety_margin;
    Some(ratio.max(min_ratio))
}

/// Canvas dimensions after applying `ratio`, truncated, each axis at least `min_dimension`.
pub fn target_dimensions(canvas_width: u32, canvas_height: u32, ratio: f64, min_dimension: u32) -> (u32, u32) {
    let axis = |size: u32| ((size as f64 * ratio) as u32).max(min_dimension);
    (axis(canvas_width), axis(canvas_height))
}

/// What the fitter decided for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    /// `None` when only the dimension ceilings had to be enforced.
    pub area_ratio: Option<f64>,
    pub target_width: u32,
    pub target_height: u32,
    /// Uniform scale applied to the canvas and every frame, never above 1.0.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fitted {
    /// Nothing needed resampling; the caller keeps using its own image.
    Unchanged { plan: FitPlan },
    Resized { image: AnimatedImage, plan: FitPlan },
}

impl Fitted {
    pub fn plan(&self) -> &FitPlan {
        match self {
            Self::Unchanged { plan } | Self::Resized { plan, .. } => plan,
        }
    }
}

/// Shrinks animations toward a byte and dimension budget.
///
/// Frames of one image are processed on a dedicated rayon pool and joined
/// before the canvas is rebuilt.
pub struct SizeFitter {
    options: FitOptions,
    fallback: Arc<FallbackPalette>,
    frame_pool: ThreadPool,
}

impl SizeFitter {
    /// `frame_jobs == 0` sizes the frame pool to the CPU count.
    pub fn new(options: FitOptions, fallback: Arc<FallbackPalette>, frame_jobs: usize) -> Result<Self> {
        let threads = if frame_jobs == 0 { num_cpus::get() } else { frame_jobs };
        let frame_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("frame-worker-{}", index))
            .build()
            .context("Failed to initialize frame thread pool")?;

        Ok(Self {
            options,
            fallback,
            frame_pool,
        })
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Work out the target size without touching any pixels.
    pub fn plan(&self, image: &AnimatedImage, original_size: u64, budget: &SizeBudget) -> FitPlan {
        let area_ratio = compute_area_ratio(
            original_size,
            budget.max_byte_size,
            self.options.safety_margin,
            self.options.min_ratio,
        );
        let (target_width, target_height) = match area_ratio {
            Some(ratio) => target_dimensions(image.width, image.height, ratio, self.options.min_dimension),
            None => (image.width, image.height),
        };

        // The byte target and the dimension ceilings are honoured by one resample.
        let box_width = target_width.min(budget.max_width);
        let box_height = target_height.min(budget.max_height);
        let scale = scale_to_fit(image.width, image.height, box_width, box_height);

        FitPlan {
            area_ratio,
            target_width,
            target_height,
            scale,
        }
    }

    /// Fit an image under `budget`.
    ///
    /// Returns [`Fitted::Unchanged`] when no shrinking is needed and every
    /// frame already respects the dimension ceilings.
    pub fn fit(&self, image: &AnimatedImage, original_size: u64, budget: &SizeBudget) -> Result<Fitted, FitError> {
        let plan = self.plan(image, original_size, budget);

        let frames_within = image
            .frames
            .iter()
            .all(|frame| frame.width() <= budget.max_width && frame.height() <= budget.max_height);
        if plan.scale >= 1.0 && frames_within {
            return Ok(Fitted::Unchanged { plan });
        }

        let image = self.fit_at_scale(image, plan.scale)?;
        Ok(Fitted::Resized { image, plan })
    }

    /// Resample every frame by `scale` relative to the canvas.
    ///
    /// Frames are first aligned to the canvas, so at scale 1.0 this still clips
    /// frames that stick out of it.
    pub fn fit_at_scale(&self, image: &AnimatedImage, scale: f64) -> Result<AnimatedImage, FitError> {
        let canvas = (image.width, image.height);
        let target = scaled_dimensions(image.width, image.height, scale);
        let global = image.global_palette.as_ref();

        let frames = self.frame_pool.install(|| {
            image
                .frames
                .par_iter()
                .map(|frame| self.fit_frame(frame, global, canvas, target))
                .collect::<Result<Vec<_>, FitError>>()
        })?;

        let mut fitted = AnimatedImage {
            width: target.0,
            height: target.1,
            global_palette: image.global_palette.clone(),
            background_index: image.background_index,
            loop_count: image.loop_count,
            frames,
        };
        fitted.recompute_canvas();
        Ok(fitted)
    }

    /// Next scale to try after an encode still came out at `actual_size`.
    ///
    /// `None` once the refinement would not shrink the canvas any further.
    pub fn refined_scale(&self, image: &AnimatedImage, scale: f64, actual_size: u64, budget: &SizeBudget) -> Option<f64> {
        if actual_size <= budget.max_byte_size || actual_size == 0 {
            return None;
        }
        let next = scale * (budget.max_byte_size as f64 / actual_size as f64).sqrt() * self.options.safety_margin;
        let current = scaled_dimensions(image.width, image.height, scale);
        let shrunk = scaled_dimensions(image.width, image.height, next);
        (shrunk != current).then_some(next)
    }

    fn fit_frame(
        &self,
        frame: &Frame,
        global: Option<&Palette>,
        (canvas_width, canvas_height): (u32, u32),
        (target_width, target_height): (u32, u32),
    ) -> Result<Frame, FitError> {
        // No colour table anywhere: the indices refer to the fallback palette.
        let frame = match frame.effective_palette(global) {
            Some(_) => Cow::Borrowed(frame),
            None => Cow::Owned(Frame {
                palette: Some(self.fallback.palette().clone()),
                transparent: frame.transparent.or(Some(self.fallback.transparent_index())),
                ..frame.clone()
            }),
        };

        let aligned = align_to_canvas(&frame, global, canvas_width, canvas_height);
        let filter = if aligned.was_padded() {
            ResampleFilter::Edge
        } else {
            ResampleFilter::Quality
        };

        let source = aligned.frame();
        let palette = source.effective_palette(global);
        let raster = frame_to_rgba(source, palette);
        let resized = resample(&raster, target_width, target_height, filter)
            .map_err(|e| FitError::encode(format!("{:#}", e)))?;

        let preferred = palette.map(|palette| PaletteChoice {
            palette,
            transparent: source.transparent,
        });
        let mut fitted = quantize(&resized, preferred, &self.fallback, self.options.dither);

        fitted.delay = frame.delay;
        fitted.disposal = frame.disposal;
        fitted.interlaced = frame.interlaced;
        // Still drawn with the image-wide table: do not duplicate it per frame.
        if source.palette.is_none() && global.is_some() {
            fitted.palette = None;
        }
        Ok(fitted)
    }
}
