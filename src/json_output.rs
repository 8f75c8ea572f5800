//! JSON output for front-end integration
//!
//! When --json-progress flag is enabled, all progress and status information
//! is emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::image_processing::{RecordOutcome, RecordReport};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// Record reached a successful terminal state
    Completed {
        input_path: String,
        /// `None` when the file was already within limits
        output_path: Option<String>,
        original_size: Option<u64>,
        final_size: Option<u64>,
        processing_time_ms: u128,
    },
    /// Record failed
    Failed {
        input_path: String,
        kind: String,
        error: String,
    },
    /// Processing summary
    Summary {
        total_files: usize,
        saved: usize,
        already_good: usize,
        failed: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Create and emit progress message (throttled to ~25 FPS)
    ///
    /// The final progress (current == total) is always emitted to ensure 100% completion.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    /// Message describing a finished record.
    pub fn from_report(report: &RecordReport) -> Self {
        let input_path = display(&report.path);
        let processing_time_ms = report.processing_time.as_millis();
        match &report.outcome {
            RecordOutcome::AlreadyGood => Self::Completed {
                input_path,
                output_path: None,
                original_size: report.original_size,
                final_size: report.original_size,
                processing_time_ms,
            },
            RecordOutcome::Saved {
                output_path,
                final_size,
                ..
            } => Self::Completed {
                input_path,
                output_path: Some(display(output_path)),
                original_size: report.original_size,
                final_size: Some(*final_size),
                processing_time_ms,
            },
            RecordOutcome::Failed { kind, message } => Self::Failed {
                input_path,
                kind: kind.to_string(),
                error: message.clone(),
            },
        }
    }

    /// Create and emit summary message
    pub fn summary(total_files: usize, saved: usize, already_good: usize, failed: usize, duration_secs: f64) {
        Self::Summary {
            total_files,
            saved,
            already_good,
            failed,
            duration_secs,
        }
        .emit();
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(outcome: RecordOutcome) -> RecordReport {
        RecordReport {
            path: PathBuf::from("cat.gif"),
            outcome,
            original_size: Some(6_000_000),
            original_canvas: Some((1200, 800)),
            processing_time: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_saved_report_serializes_as_completed() {
        let message = JsonMessage::from_report(&report(RecordOutcome::Saved {
            output_path: PathBuf::from("WeChat_cat.gif"),
            final_size: 3_000_000,
            final_width: 1000,
            final_height: 667,
            refinements: 0,
        }));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "completed");
        assert_eq!(json["output_path"], "WeChat_cat.gif");
        assert_eq!(json["final_size"], 3_000_000);
        assert_eq!(json["processing_time_ms"], 42);
    }

    #[test]
    fn test_failed_report_carries_kind() {
        let message = JsonMessage::from_report(&report(RecordOutcome::Failed {
            kind: ErrorKind::DecodeFailure,
            message: "bad header".to_string(),
        }));
        let json = serde_json::to_string(&message).unwrap();
        let back: JsonMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back,
            JsonMessage::Failed {
                input_path: "cat.gif".to_string(),
                kind: "decode failure".to_string(),
                error: "bad header".to_string(),
            }
        );
    }

    #[test]
    fn test_already_good_has_no_output() {
        let message = JsonMessage::from_report(&report(RecordOutcome::AlreadyGood));
        match message {
            JsonMessage::Completed {
                output_path,
                final_size,
                ..
            } => {
                assert!(output_path.is_none());
                assert_eq!(final_size, Some(6_000_000));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }
}
