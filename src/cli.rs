use clap::Parser;
use std::path::PathBuf;

use crate::image_processing::batch::DEFAULT_MAX_CONCURRENT_IMAGES;
use crate::image_processing::constraints::{
    SizeBudget, DEFAULT_AUTOPLAY_BYTE_SIZE, DEFAULT_MAX_BYTE_SIZE, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH,
};
use crate::image_processing::fit::{FitOptions, DEFAULT_MIN_DIMENSION, DEFAULT_MIN_RATIO, DEFAULT_SAFETY_MARGIN};
use crate::image_processing::quantize::DitherMethod;
use crate::image_processing::ProcessingConfig;
use crate::storage::DEFAULT_OUTPUT_PREFIX;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gif-fitter",
    version,
    about = "Shrink animated GIFs until they fit chat upload limits",
    long_about = "
GIF Fitter

Resizes and re-quantizes animated GIFs so that every frame fits within a maximum
width/height and the encoded file stays below a byte budget (5 MiB, or 1 MiB for
animations that should autoplay). Files that already fit are left alone; fitted
copies are written next to the source as WeChat_<name>.gif.

Example Usage:
  # Fit a couple of files
  gif-fitter cat.gif dog.gif

  # Fit every GIF in a directory, aiming for the autoplay budget
  gif-fitter -d ~/Downloads/stickers --autoplay

  # Recursive scan, 8 images at a time, results into a separate directory
  gif-fitter -d ~/gifs --recursive -w 8 -o ~/gifs-small --report

  # Re-encode up to two more times when the first estimate is still too big
  gif-fitter big.gif --refine 2 --verbose

  # Dry run mode: show what would be written without creating files
  gif-fitter -d ~/gifs --dry-run --verbose"
)]
pub struct Args {
    /// GIF files, or directories when -d is given
    #[arg(value_name = "PATH", required_unless_present = "config_file")]
    pub input_paths: Vec<PathBuf>,

    /// Treat inputs as directories and process every .gif inside
    #[arg(short = 'd', long = "dir")]
    pub directory: bool,

    /// Descend into subdirectories (with -d)
    #[arg(long = "recursive")]
    pub recursive: bool,

    /// Target the smaller autoplay byte budget
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Maximum number of images fitted at the same time (0 selects the default)
    #[arg(short = 'w', long = "workers", default_value_t = DEFAULT_MAX_CONCURRENT_IMAGES, value_name = "N")]
    pub workers: usize,

    /// Threads used for per-frame work inside one image (0 = auto-detect CPU cores)
    #[arg(long = "frame-jobs", default_value_t = 0, value_name = "N")]
    pub frame_jobs: usize,

    /// Maximum frame width in pixels
    #[arg(long = "max-width", default_value_t = DEFAULT_MAX_WIDTH, value_name = "PX")]
    pub max_width: u32,

    /// Maximum frame height in pixels
    #[arg(long = "max-height", default_value_t = DEFAULT_MAX_HEIGHT, value_name = "PX")]
    pub max_height: u32,

    /// Byte budget for regular uploads
    #[arg(long = "max-size", default_value_t = DEFAULT_MAX_BYTE_SIZE, value_name = "BYTES")]
    pub max_size: u64,

    /// Byte budget used with --autoplay
    #[arg(long = "autoplay-size", default_value_t = DEFAULT_AUTOPLAY_BYTE_SIZE, value_name = "BYTES")]
    pub autoplay_size: u64,

    /// Multiplier applied to the estimated shrink ratio (0.0-1.0]
    #[arg(long = "safety-margin", default_value_t = DEFAULT_SAFETY_MARGIN, value_name = "FACTOR")]
    pub safety_margin: f64,

    /// Smallest shrink ratio ever applied (0.0-1.0]
    #[arg(long = "min-ratio", default_value_t = DEFAULT_MIN_RATIO, value_name = "FACTOR")]
    pub min_ratio: f64,

    /// Smallest target width/height produced by the byte estimate
    #[arg(long = "min-dimension", default_value_t = DEFAULT_MIN_DIMENSION, value_name = "PX")]
    pub min_dimension: u32,

    /// Extra encode-and-shrink rounds when the result is still over budget
    #[arg(long = "refine", default_value_t = 0, value_name = "N")]
    pub refine: u32,

    /// Dithering method used when re-quantizing frames
    #[arg(
        long = "dither",
        value_enum,
        default_value = "floyd-steinberg",
        value_name = "METHOD",
        help = "Dithering algorithm: floyd-steinberg (best gradients), atkinson (bright), stucki (diffused), jarvis (photos), none"
    )]
    pub dither: DitherMethod,

    /// File name prefix of fitted copies
    #[arg(long = "prefix", default_value = DEFAULT_OUTPUT_PREFIX, value_name = "PREFIX")]
    pub prefix: String,

    /// Write fitted copies into this directory instead of next to the source
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Perform a dry run: fit and encode but do not write any files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Display a table with the outcome of every file at the end
    #[arg(long = "report")]
    pub report: bool,

    /// Emit progress as JSON lines on stdout instead of the progress bar
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Load options from a JSON config file (command line values take precedence)
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input_paths: vec![],
            directory: false,
            recursive: false,
            autoplay: false,
            workers: DEFAULT_MAX_CONCURRENT_IMAGES,
            frame_jobs: 0,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_size: DEFAULT_MAX_BYTE_SIZE,
            autoplay_size: DEFAULT_AUTOPLAY_BYTE_SIZE,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            min_ratio: DEFAULT_MIN_RATIO,
            min_dimension: DEFAULT_MIN_DIMENSION,
            refine: 0,
            dither: DitherMethod::default(),
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_dir: None,
            dry_run: false,
            report: false,
            json_progress: false,
            verbose: false,
            config_file: None,
        }
    }
}

impl Args {
    /// Ceilings for this run; `--autoplay` swaps in the smaller byte budget.
    pub fn size_budget(&self) -> SizeBudget {
        SizeBudget::for_mode(
            self.autoplay,
            self.max_width,
            self.max_height,
            self.max_size,
            self.autoplay_size,
        )
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            safety_margin: self.safety_margin,
            min_ratio: self.min_ratio,
            min_dimension: self.min_dimension,
            dither: self.dither,
            max_refinements: self.refine,
        }
    }

    pub fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig {
            budget: self.size_budget(),
            fit: self.fit_options(),
            max_concurrent_images: self.workers,
            frame_jobs: self.frame_jobs,
            recursive: self.recursive,
            output_prefix: self.prefix.clone(),
            // JSON mode owns stdout.
            verbose: self.verbose && !self.json_progress,
        }
    }
}
