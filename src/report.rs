//! Per-file outcome table printed with `--report`.
use prettytable::{format, Cell, Row, Table};
use std::path::Path;

use crate::image_processing::{RecordOutcome, RecordReport};
use crate::utils::format_bytes;

/// One row of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub input_filename: String,
    pub status: String,
    pub original_size: Option<u64>,
    pub final_size: Option<u64>,
    pub original_canvas: Option<(u32, u32)>,
    pub final_canvas: Option<(u32, u32)>,
    pub refinements: u32,
    pub detail: String,
}

impl ReportEntry {
    pub fn from_report(report: &RecordReport) -> Self {
        let input_filename = extract_filename(&report.path);
        match &report.outcome {
            RecordOutcome::AlreadyGood => Self {
                input_filename,
                status: "✓ good".to_string(),
                original_size: report.original_size,
                final_size: report.original_size,
                original_canvas: report.original_canvas,
                final_canvas: report.original_canvas,
                refinements: 0,
                detail: "already within limits".to_string(),
            },
            RecordOutcome::Saved {
                output_path,
                final_size,
                final_width,
                final_height,
                refinements,
            } => Self {
                input_filename,
                status: "✓ saved".to_string(),
                original_size: report.original_size,
                final_size: Some(*final_size),
                original_canvas: report.original_canvas,
                final_canvas: Some((*final_width, *final_height)),
                refinements: *refinements,
                detail: extract_filename(output_path),
            },
            RecordOutcome::Failed { kind, message } => Self {
                input_filename,
                status: format!("✗ {}", kind),
                original_size: report.original_size,
                final_size: None,
                original_canvas: report.original_canvas,
                final_canvas: None,
                refinements: 0,
                detail: message.clone(),
            },
        }
    }
}

/// Complete outcome report
#[derive(Debug, Default)]
pub struct FitReport {
    pub entries: Vec<ReportEntry>,
}

impl FitReport {
    pub fn from_reports(reports: &[RecordReport]) -> Self {
        Self {
            entries: reports.iter().map(ReportEntry::from_report).collect(),
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.add_row(Row::new(vec![
            Cell::new("Input"),
            Cell::new("Status"),
            Cell::new("Size"),
            Cell::new("Fitted"),
            Cell::new("Canvas"),
            Cell::new("Fitted canvas"),
            Cell::new("Retries"),
            Cell::new("Detail"),
        ]));

        for entry in &self.entries {
            table.add_row(Row::new(vec![
                Cell::new(&truncate(&entry.input_filename, 25)),
                Cell::new(&entry.status),
                Cell::new(&optional(entry.original_size.map(format_bytes))),
                Cell::new(&optional(entry.final_size.map(format_bytes))),
                Cell::new(&optional(entry.original_canvas.map(format_canvas))),
                Cell::new(&optional(entry.final_canvas.map(format_canvas))),
                Cell::new(&entry.refinements.to_string()),
                Cell::new(&truncate(&entry.detail, 40)),
            ]));
        }

        table
    }

    /// Print the complete report as a formatted table
    pub fn print(&self) {
        println!("\n📊 REPORT ({} files)\n", self.entries.len());
        self.to_table().printstd();

        let saved: Vec<_> = self
            .entries
            .iter()
            .filter_map(|e| Some((e.original_size?, e.final_size?)))
            .filter(|(before, after)| after < before)
            .collect();
        if !saved.is_empty() {
            let before: u64 = saved.iter().map(|(b, _)| b).sum();
            let after: u64 = saved.iter().map(|(_, a)| a).sum();
            println!();
            println!(
                "   • Shrunk {} files: {} → {}",
                saved.len(),
                format_bytes(before),
                format_bytes(after)
            );
        }
        println!();
    }
}

fn format_canvas((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Truncate string to fit in column
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Helper to extract filename from path
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(path: &str, outcome: RecordOutcome) -> RecordReport {
        RecordReport {
            path: PathBuf::from(path),
            outcome,
            original_size: Some(6_291_456),
            original_canvas: Some((1600, 900)),
            processing_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_entries_follow_outcomes() {
        let reports = vec![
            report("/gifs/good.gif", RecordOutcome::AlreadyGood),
            report(
                "/gifs/big.gif",
                RecordOutcome::Saved {
                    output_path: PathBuf::from("/gifs/WeChat_big.gif"),
                    final_size: 3_145_728,
                    final_width: 1000,
                    final_height: 563,
                    refinements: 1,
                },
            ),
            report(
                "/gifs/broken.gif",
                RecordOutcome::Failed {
                    kind: ErrorKind::DecodeFailure,
                    message: "bad header".to_string(),
                },
            ),
        ];
        let fit_report = FitReport::from_reports(&reports);

        assert_eq!(fit_report.entries.len(), 3);
        assert_eq!(fit_report.entries[0].final_canvas, Some((1600, 900)));
        assert_eq!(fit_report.entries[1].detail, "WeChat_big.gif");
        assert_eq!(fit_report.entries[1].final_canvas, Some((1000, 563)));
        assert_eq!(fit_report.entries[1].refinements, 1);
        assert_eq!(fit_report.entries[2].status, "✗ decode failure");
        assert_eq!(fit_report.entries[2].final_size, None);

        let rendered = fit_report.to_table().to_string();
        assert!(rendered.contains("big.gif"));
        assert!(rendered.contains("6.00 MiB"));
        assert!(rendered.contains("3.00 MiB"));
        assert!(rendered.contains("1000x563"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("日本語のファイル名", 4), "日本語…");
    }
}
