use anyhow::Result;
use clap::Parser;
use console::style;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use gif_fitter::cli::Args;
use gif_fitter::codec::GifCodec;
use gif_fitter::image_processing::batch::concurrency_limit;
use gif_fitter::image_processing::{ProcessingEngine, RecordOutcome, RecordReport};
use gif_fitter::json_output::JsonMessage;
use gif_fitter::report::FitReport;
use gif_fitter::storage::FsStorage;
use gif_fitter::utils::{
    create_progress_bar, error_println, format_bytes, format_duration, validate_inputs,
    ProcessingStats,
};

fn print_configuration(args: &Args) {
    let budget = args.size_budget();
    println!("{}", style("Configuration:").bold());
    println!("  Max frame size: {}x{}", budget.max_width, budget.max_height);
    println!(
        "  Byte budget: {} ({})",
        format_bytes(budget.max_byte_size),
        if args.autoplay { "autoplay" } else { "standard" }
    );
    println!("  Safety margin: {}", args.safety_margin);
    println!("  Minimum area ratio: {}", args.min_ratio);
    println!("  Minimum dimension: {}px", args.min_dimension);
    println!("  Dither: {:?}", args.dither);
    println!("  Refinement rounds: {}", args.refine);
    println!("  Concurrent images: {}", concurrency_limit(args.workers));
    println!(
        "  Frame jobs: {}",
        if args.frame_jobs == 0 {
            num_cpus::get()
        } else {
            args.frame_jobs
        }
    );
    match &args.output_dir {
        Some(dir) => println!("  Output: {}/{}<name>.gif", dir.display(), args.prefix),
        None => println!("  Output: next to each source as {}<name>.gif", args.prefix),
    }
    if args.dry_run {
        println!("  Dry run mode: enabled (simulation only - no files will be created)");
    }
    println!();
}

fn print_record_line(report: &RecordReport, dry_run: bool) {
    let filename = gif_fitter::report::extract_filename(&report.path);
    match &report.outcome {
        RecordOutcome::AlreadyGood => println!(
            "  {} {} - already within limits",
            style("✓").green(),
            style(filename).bold()
        ),
        RecordOutcome::Saved {
            output_path,
            final_size,
            final_width,
            final_height,
            ..
        } => println!(
            "  {} {} → {} ({}x{}, {}){}",
            style("✓").green(),
            style(filename).bold(),
            style(output_path.display()).cyan(),
            final_width,
            final_height,
            format_bytes(*final_size),
            if dry_run { " [dry run]" } else { "" }
        ),
        RecordOutcome::Failed { kind, message } => println!(
            "  {} {} - {}: {}",
            style("✗").red(),
            style(filename).bold().red(),
            kind,
            message
        ),
    }
}

fn print_summary(stats: &ProcessingStats, dry_run: bool) {
    let header = if dry_run {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    let saved_label = if dry_run { "Would be saved" } else { "Saved" };
    println!("  {}: {}", saved_label, style(stats.saved).bold().green());
    println!("  Already good: {}", style(stats.already_good).bold());
    if stats.failed > 0 {
        println!("  Failed: {}", style(stats.failed).bold().red());
    }
    println!("  Success rate: {:.1}%", stats.success_rate());
    if stats.saved > 0 {
        println!(
            "  Bytes: {} → {}",
            format_bytes(stats.bytes_before),
            format_bytes(stats.bytes_after)
        );
    }

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(stats.total_duration)).bold()
    );
    println!(
        "  Average time per image: {}",
        style(format_duration(stats.average_duration())).dim()
    );
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;
    let json_mode = args.json_progress;

    if !json_mode {
        println!("{}", style("GIF Fitter").bold().blue());
        println!("{}", style("Shrinks animated GIFs to fit upload limits").dim());
        println!();
    }

    validate_inputs(&args)?;

    let config = args.processing_config();
    if config.verbose {
        print_configuration(&args);
    }

    let storage = FsStorage::new(args.prefix.clone(), args.output_dir.clone(), args.dry_run);
    let engine = ProcessingEngine::new(config, Arc::new(GifCodec::new()), Arc::new(storage))?;

    let gif_files = engine.discover_gifs(&args.input_paths, args.directory)?;
    if gif_files.is_empty() {
        if json_mode {
            JsonMessage::summary(0, 0, 0, 0, start_time.elapsed().as_secs_f64());
        } else {
            println!("{}", style("No GIF files found").red());
        }
        return Ok(());
    }

    let total = gif_files.len();
    let reports = if json_mode {
        let done = AtomicUsize::new(0);
        JsonMessage::progress(0, total, "Processing GIFs");
        engine.run(&gif_files, |report| {
            JsonMessage::from_report(report).emit();
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            JsonMessage::progress(current, total, report.path.display().to_string());
        })
    } else {
        let progress = create_progress_bar(total as u64);
        progress.set_message("Fitting GIFs");
        let reports = engine.run(&gif_files, |report| {
            let state = if report.is_failure() { "✗" } else { "✓" };
            progress.set_message(format!(
                "{} {}",
                state,
                gif_fitter::report::extract_filename(&report.path)
            ));
            progress.inc(1);
        });
        progress.finish_with_message("✓ Processing complete!");
        println!();
        reports
    };

    let stats = ProcessingStats::from_reports(&reports, start_time.elapsed());

    if json_mode {
        JsonMessage::summary(
            stats.total_files,
            stats.saved,
            stats.already_good,
            stats.failed,
            stats.total_duration.as_secs_f64(),
        );
    } else {
        println!("{}", style("Records:").bold().blue());
        for report in &reports {
            print_record_line(report, args.dry_run);
        }
        println!();
        print_summary(&stats, args.dry_run);

        if args.report {
            FitReport::from_reports(&reports).print();
        }
    }

    if stats.failed > 0 {
        if !json_mode {
            println!();
            error_println(&format!(
                "{} of {} files could not be fitted",
                stats.failed, stats.total_files
            ));
        }
        std::process::exit(1);
    }

    Ok(())
}
