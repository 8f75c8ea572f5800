use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;
use crate::image_processing::{RecordOutcome, RecordReport};

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Format a byte count with binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if args.input_paths.is_empty() {
        return Err(anyhow::anyhow!("No input paths given"));
    }

    for input_path in &args.input_paths {
        if !input_path.exists() {
            return Err(anyhow::anyhow!(
                "Input path does not exist: {}",
                input_path.display()
            ));
        }
        if !input_path.is_dir() && !input_path.is_file() {
            return Err(anyhow::anyhow!(
                "Input path is neither a file nor a directory: {}",
                input_path.display()
            ));
        }
    }

    if args.max_width == 0 || args.max_height == 0 {
        return Err(anyhow::anyhow!(
            "Maximum width and height must be greater than 0, got: {}x{}",
            args.max_width,
            args.max_height
        ));
    }
    if args.max_width > u16::MAX as u32 || args.max_height > u16::MAX as u32 {
        return Err(anyhow::anyhow!(
            "Maximum width and height must not exceed {} pixels",
            u16::MAX
        ));
    }

    if args.max_size == 0 || args.autoplay_size == 0 {
        return Err(anyhow::anyhow!("Byte budgets must be greater than 0"));
    }

    if !(args.safety_margin > 0.0 && args.safety_margin <= 1.0) {
        return Err(anyhow::anyhow!(
            "Safety margin must be in (0.0, 1.0], got: {}",
            args.safety_margin
        ));
    }
    if !(args.min_ratio > 0.0 && args.min_ratio <= 1.0) {
        return Err(anyhow::anyhow!(
            "Minimum ratio must be in (0.0, 1.0], got: {}",
            args.min_ratio
        ));
    }
    if args.min_dimension == 0 {
        return Err(anyhow::anyhow!("Minimum dimension must be greater than 0"));
    }

    if args.workers > 64 {
        return Err(anyhow::anyhow!(
            "Worker count too high (max 64), got: {}",
            args.workers
        ));
    }

    if args.prefix.is_empty() && args.output_dir.is_none() {
        return Err(anyhow::anyhow!(
            "An empty --prefix would overwrite the sources; use --output to write elsewhere"
        ));
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified (lowercase) extensions
pub fn has_valid_extension(path: &Path, extensions: &[&str]) -> bool {
    get_file_extension(path).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

/// Calculate processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub saved: usize,
    pub already_good: usize,
    pub failed: usize,
    /// Original size of the saved files
    pub bytes_before: u64,
    /// Size of the fitted copies
    pub bytes_after: u64,
    pub total_duration: Duration,
}

impl ProcessingStats {
    pub fn from_reports(reports: &[RecordReport], total_duration: Duration) -> Self {
        let mut stats = Self {
            total_files: reports.len(),
            total_duration,
            ..Default::default()
        };
        for report in reports {
            match &report.outcome {
                RecordOutcome::AlreadyGood => stats.already_good += 1,
                RecordOutcome::Saved { final_size, .. } => {
                    stats.saved += 1;
                    stats.bytes_before += report.original_size.unwrap_or(0);
                    stats.bytes_after += final_size;
                }
                RecordOutcome::Failed { .. } => stats.failed += 1,
            }
        }
        stats
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            ((self.saved + self.already_good) as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn average_duration(&self) -> Duration {
        if self.total_files == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.total_files as u32
        }
    }
}
