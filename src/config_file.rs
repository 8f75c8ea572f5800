use crate::cli::Args;
use crate::image_processing::batch::DEFAULT_MAX_CONCURRENT_IMAGES;
use crate::image_processing::constraints::{
    DEFAULT_AUTOPLAY_BYTE_SIZE, DEFAULT_MAX_BYTE_SIZE, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH,
};
use crate::image_processing::fit::{DEFAULT_MIN_DIMENSION, DEFAULT_MIN_RATIO, DEFAULT_SAFETY_MARGIN};
use crate::image_processing::quantize::DitherMethod;
use crate::storage::DEFAULT_OUTPUT_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Saved set of options, as written by `--config` users or other front ends.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: FitterConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitterConfigJson {
    pub input_paths: Option<Vec<String>>,
    pub directory: Option<bool>,
    pub recursive: Option<bool>,
    pub autoplay: Option<bool>,
    pub workers: Option<usize>,
    pub frame_jobs: Option<usize>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub max_size: Option<u64>,
    pub autoplay_size: Option<u64>,
    pub safety_margin: Option<f64>,
    pub min_ratio: Option<f64>,
    pub min_dimension: Option<u32>,
    pub refine: Option<u32>,
    pub dither_method: Option<String>,
    pub prefix: Option<String>,
    pub output_path: Option<String>,
    pub dry_run: Option<bool>,
    pub report: Option<bool>,
    pub verbose: Option<bool>,
}

/// Map a dither name from a config file, accepting camelCase spellings too.
fn parse_dither(name: &str) -> Option<DitherMethod> {
    match name {
        "floyd-steinberg" | "floydSteinberg" => Some(DitherMethod::FloydSteinberg),
        "atkinson" => Some(DitherMethod::Atkinson),
        "stucki" => Some(DitherMethod::Stucki),
        "jarvis" | "jarvis-judice-ninke" | "jarvisJudiceNinke" => Some(DitherMethod::JarvisJudiceNinke),
        "none" => Some(DitherMethod::None),
        _ => None,
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = read_config_file(&config_path)?;
            self.merge_from_config(config.config)?;

            if self.verbose && !self.json_progress {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    /// Fill in every option still at its default from `config`.
    pub fn merge_from_config(&mut self, config: FitterConfigJson) -> Result<()> {
        if self.input_paths.is_empty() {
            if let Some(inputs) = config.input_paths {
                self.input_paths = inputs.into_iter().map(PathBuf::from).collect();
            }
        }

        if self.output_dir.is_none() {
            self.output_dir = config.output_path.map(PathBuf::from);
        }

        // Boolean flags - only apply if currently false (default)
        if !self.directory {
            self.directory = config.directory.unwrap_or(false);
        }
        if !self.recursive {
            self.recursive = config.recursive.unwrap_or(false);
        }
        if !self.autoplay {
            self.autoplay = config.autoplay.unwrap_or(false);
        }
        if !self.dry_run {
            self.dry_run = config.dry_run.unwrap_or(false);
        }
        if !self.report {
            self.report = config.report.unwrap_or(false);
        }
        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        // Numeric parameters - only apply if using defaults
        if self.workers == DEFAULT_MAX_CONCURRENT_IMAGES {
            if let Some(workers) = config.workers {
                self.workers = workers;
            }
        }
        if self.frame_jobs == 0 {
            if let Some(jobs) = config.frame_jobs {
                self.frame_jobs = jobs;
            }
        }
        if self.max_width == DEFAULT_MAX_WIDTH {
            if let Some(width) = config.max_width {
                self.max_width = width;
            }
        }
        if self.max_height == DEFAULT_MAX_HEIGHT {
            if let Some(height) = config.max_height {
                self.max_height = height;
            }
        }
        if self.max_size == DEFAULT_MAX_BYTE_SIZE {
            if let Some(size) = config.max_size {
                self.max_size = size;
            }
        }
        if self.autoplay_size == DEFAULT_AUTOPLAY_BYTE_SIZE {
            if let Some(size) = config.autoplay_size {
                self.autoplay_size = size;
            }
        }
        if self.safety_margin == DEFAULT_SAFETY_MARGIN {
            if let Some(margin) = config.safety_margin {
                self.safety_margin = margin;
            }
        }
        if self.min_ratio == DEFAULT_MIN_RATIO {
            if let Some(ratio) = config.min_ratio {
                self.min_ratio = ratio;
            }
        }
        if self.min_dimension == DEFAULT_MIN_DIMENSION {
            if let Some(dimension) = config.min_dimension {
                self.min_dimension = dimension;
            }
        }
        if self.refine == 0 {
            if let Some(refine) = config.refine {
                self.refine = refine;
            }
        }

        if self.dither == DitherMethod::default() {
            if let Some(name) = config.dither_method {
                self.dither = parse_dither(&name)
                    .with_context(|| format!("Unknown dither method in config file: '{}'", name))?;
            }
        }

        if self.prefix == DEFAULT_OUTPUT_PREFIX {
            if let Some(prefix) = config.prefix {
                self.prefix = prefix;
            }
        }

        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
}
