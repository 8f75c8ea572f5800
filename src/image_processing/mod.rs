pub mod align;
pub mod batch;
pub mod constraints;
pub mod fit;
pub mod model;
pub mod palette;
pub mod quantize;
pub mod resize;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::codec::Codec;
use crate::error::{ErrorKind, FitError};
use crate::storage::Storage;
use crate::utils::{format_duration, has_valid_extension, verbose_println, warn_println};

use batch::{AdmissionGate, BatchProcessor, ImagePool, Permit};
use constraints::{is_acceptable, SizeBudget, Violation};
use fit::{FitOptions, Fitted, SizeFitter};
use model::AnimatedImage;
use palette::FallbackPalette;

/// File extensions picked up when scanning directories.
pub const GIF_EXTENSIONS: &[&str] = &["gif"];

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub budget: SizeBudget,
    pub fit: FitOptions,
    /// Images allowed in the fitting stage at once.
    pub max_concurrent_images: usize,
    /// Threads for per-frame work, 0 for one per CPU.
    pub frame_jobs: usize,
    /// Descend into subdirectories when scanning.
    pub recursive: bool,
    /// Prefix of fitted outputs, skipped when scanning directories.
    pub output_prefix: String,
    pub verbose: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            budget: SizeBudget::default(),
            fit: FitOptions::default(),
            max_concurrent_images: batch::DEFAULT_MAX_CONCURRENT_IMAGES,
            frame_jobs: 0,
            recursive: false,
            output_prefix: crate::storage::DEFAULT_OUTPUT_PREFIX.to_string(),
            verbose: false,
        }
    }
}

/// A decoded source waiting to be checked and fitted.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub path: PathBuf,
    pub image: AnimatedImage,
    pub original_size: u64,
}

/// Terminal state of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Already within every ceiling; nothing was written.
    AlreadyGood,
    Saved {
        output_path: PathBuf,
        final_size: u64,
        final_width: u32,
        final_height: u32,
        /// Extra encode rounds spent after the first estimate.
        refinements: u32,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct RecordReport {
    pub path: PathBuf,
    pub outcome: RecordOutcome,
    /// Unknown when the source could not be stat'ed.
    pub original_size: Option<u64>,
    pub original_canvas: Option<(u32, u32)>,
    pub processing_time: Duration,
}

impl RecordReport {
    fn failed(path: &Path, error: &FitError, started: Instant) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: RecordOutcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
            original_size: None,
            original_canvas: None,
            processing_time: started.elapsed(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Failed { .. })
    }
}

struct FittedRecord {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    refinements: u32,
}

/// Drives records through check → fit → encode → save.
pub struct ProcessingEngine {
    config: ProcessingConfig,
    fitter: SizeFitter,
    codec: Arc<dyn Codec>,
    storage: Arc<dyn Storage>,
    images: ImagePool,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig, codec: Arc<dyn Codec>, storage: Arc<dyn Storage>) -> Result<Self> {
        let fallback = Arc::new(FallbackPalette::new());
        let fitter = SizeFitter::new(config.fit, fallback, config.frame_jobs)
            .context("Failed to set up the size fitter")?;
        let images = ImagePool::new(config.max_concurrent_images)?;

        Ok(Self {
            config,
            fitter,
            codec,
            storage,
            images,
        })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn gate(&self) -> &AdmissionGate {
        self.images.gate()
    }

    /// Expand the command line inputs into GIF files.
    ///
    /// With `directory_mode` every input is scanned for `.gif` files (skipping
    /// previously fitted outputs); without it inputs are taken as files and
    /// directories are skipped with a warning.
    pub fn discover_gifs(&self, inputs: &[PathBuf], directory_mode: bool) -> Result<Vec<PathBuf>> {
        let mut gif_files = Vec::new();

        for input in inputs {
            if !input.is_dir() {
                if directory_mode {
                    warn_println(&format!("'{}' is not a directory, skipping", input.display()));
                } else {
                    gif_files.push(input.clone());
                }
                continue;
            }
            if !directory_mode {
                warn_println(&format!("'{}' is a directory, use -d flag instead", input.display()));
                continue;
            }

            verbose_println(self.config.verbose, &format!("Scanning directory: {}", input.display()));

            let max_depth = if self.config.recursive { usize::MAX } else { 1 };
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(false).max_depth(max_depth) {
                let entry = entry.with_context(|| format!("Failed to read directory entry in {}", input.display()))?;
                let path = entry.path();
                if !entry.file_type().is_file() || !has_valid_extension(path, GIF_EXTENSIONS) {
                    continue;
                }
                let already_fitted = !self.config.output_prefix.is_empty()
                    && entry
                        .file_name()
                        .to_string_lossy()
                        .starts_with(&self.config.output_prefix);
                if already_fitted {
                    verbose_println(self.config.verbose, &format!("Skipping fitted output: {}", path.display()));
                    continue;
                }
                found.push(path.to_path_buf());
            }

            // Sort for consistent processing order
            found.sort();
            gif_files.extend(found);
        }

        verbose_println(self.config.verbose, &format!("Found {} GIF files", gif_files.len()));
        Ok(gif_files)
    }

    fn load_source(&self, path: &Path) -> Result<SourceRecord, FitError> {
        let original_size = self.storage.byte_size(path)?;
        let bytes = self.storage.read(path)?;
        let image = self.codec.decode(&bytes).map_err(|e| e.at(path))?;
        Ok(SourceRecord {
            path: path.to_path_buf(),
            image,
            original_size,
        })
    }

    /// Stat and decode every path in parallel.
    ///
    /// Failures come back as finished [`RecordReport`]s at the same position.
    pub fn load_sources(&self, paths: &[PathBuf]) -> Vec<Result<SourceRecord, RecordReport>> {
        paths
            .par_iter()
            .map(|path| {
                let started = Instant::now();
                self.load_source(path).map_err(|error| {
                    verbose_println(self.config.verbose, &format!("✗ {}", error));
                    RecordReport::failed(path, &error, started)
                })
            })
            .collect()
    }

    /// Check, fit and save every record. Reports keep the input order.
    pub fn process<F>(&self, records: Vec<SourceRecord>, on_complete: F) -> Vec<RecordReport>
    where
        F: Fn(&RecordReport) + Sync,
    {
        verbose_println(
            self.config.verbose,
            &format!(
                "Processing {} records on {} workers",
                records.len(),
                self.images.workers().min(records.len())
            ),
        );

        let batch = BatchProcessor::new(records.len());
        self.images.run(records, |record, permit| {
            let report = self.process_record(record, permit);
            let done = batch.increment();
            if self.config.verbose {
                let eta = batch.eta().map(format_duration).unwrap_or_else(|| "?".to_string());
                verbose_println(
                    true,
                    &format!(
                        "[{}/{}] {:.0}% done, ETA {}",
                        done,
                        batch.total_files,
                        batch.progress() * 100.0,
                        eta
                    ),
                );
            }
            on_complete(&report);
            report
        })
    }

    /// Load then process `paths`, returning one report per path in order.
    pub fn run<F>(&self, paths: &[PathBuf], on_complete: F) -> Vec<RecordReport>
    where
        F: Fn(&RecordReport) + Sync,
    {
        let mut reports: Vec<Option<RecordReport>> = Vec::with_capacity(paths.len());
        let mut pending = Vec::new();
        let mut slots = Vec::new();

        for (index, loaded) in self.load_sources(paths).into_iter().enumerate() {
            match loaded {
                Ok(record) => {
                    reports.push(None);
                    slots.push(index);
                    pending.push(record);
                }
                Err(report) => {
                    on_complete(&report);
                    reports.push(Some(report));
                }
            }
        }

        for (slot, report) in slots.into_iter().zip(self.process(pending, &on_complete)) {
            reports[slot] = Some(report);
        }

        reports.into_iter().flatten().collect()
    }

    /// `permit` is held until the record is fitted; already good records
    /// hand it back straight after the check.
    fn process_record(&self, record: SourceRecord, permit: Permit<'_>) -> RecordReport {
        let started = Instant::now();
        let verbose = self.config.verbose;
        let budget = &self.config.budget;
        let name = record.path.display().to_string();

        let mut report = RecordReport {
            path: record.path.clone(),
            outcome: RecordOutcome::AlreadyGood,
            original_size: Some(record.original_size),
            original_canvas: Some((record.image.width, record.image.height)),
            processing_time: Duration::ZERO,
        };

        if is_acceptable(&record.image, record.original_size, budget) {
            drop(permit);
            verbose_println(verbose, &format!("✓ '{}' is already good", name));
            report.processing_time = started.elapsed();
            return report;
        }

        if verbose {
            for violation in budget.violations(&record.image, record.original_size) {
                let detail = match violation {
                    Violation::Width { frame, width } => {
                        format!("frame {} is {} px wide (max {})", frame, width, budget.max_width)
                    }
                    Violation::Height { frame, height } => {
                        format!("frame {} is {} px high (max {})", frame, height, budget.max_height)
                    }
                    Violation::ByteSize { size } => {
                        format!("{} bytes (max {})", size, budget.max_byte_size)
                    }
                };
                verbose_println(verbose, &format!("'{}': {}", name, detail));
            }
        }

        let fitted = self.fit_record(&record);
        drop(permit);

        let result = fitted.and_then(|fitted| {
            let output_path = self.storage.write(&record.path, &fitted.bytes)?;
            Ok(RecordOutcome::Saved {
                output_path,
                final_size: fitted.bytes.len() as u64,
                final_width: fitted.width,
                final_height: fitted.height,
                refinements: fitted.refinements,
            })
        });

        report.outcome = match result {
            Ok(saved) => {
                verbose_println(verbose, &format!("✓ Saved resized image for '{}'", name));
                saved
            }
            Err(error) => {
                verbose_println(verbose, &format!("✗ {}", error));
                RecordOutcome::Failed {
                    kind: error.kind(),
                    message: error.to_string(),
                }
            }
        };
        report.processing_time = started.elapsed();
        report
    }

    fn fit_record(&self, record: &SourceRecord) -> Result<FittedRecord, FitError> {
        let verbose = self.config.verbose;
        let budget = &self.config.budget;

        let fitted = self.fitter.fit(&record.image, record.original_size, budget)?;
        let plan = *fitted.plan();
        if let Some(ratio) = plan.area_ratio {
            verbose_println(
                verbose,
                &format!(
                    "'{}': area ratio {:.3}, target {}x{}, scale {:.3}",
                    record.path.display(),
                    ratio,
                    plan.target_width,
                    plan.target_height,
                    plan.scale
                ),
            );
        }

        let mut current = match fitted {
            Fitted::Unchanged { .. } => Cow::Borrowed(&record.image),
            Fitted::Resized { image, .. } => Cow::Owned(image),
        };
        let mut bytes = self.codec.encode(&current)?;
        let mut scale = plan.scale;
        let mut refinements = 0;

        while refinements < self.fitter.options().max_refinements {
            let Some(next) = self
                .fitter
                .refined_scale(&record.image, scale, bytes.len() as u64, budget)
            else {
                break;
            };
            verbose_println(
                verbose,
                &format!(
                    "'{}': {} bytes still over budget, retrying at scale {:.3}",
                    record.path.display(),
                    bytes.len(),
                    next
                ),
            );
            let image = self.fitter.fit_at_scale(&record.image, next)?;
            bytes = self.codec.encode(&image)?;
            current = Cow::Owned(image);
            scale = next;
            refinements += 1;
        }

        Ok(FittedRecord {
            bytes,
            width: current.width,
            height: current.height,
            refinements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::GifCodec;
    use model::{Frame, FrameRect, Palette};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;

    /// Codec that hands out pre-built images by their first byte and encodes
    /// to `width * height` bytes, so sizes are predictable.
    struct FakeCodec {
        images: HashMap<u8, AnimatedImage>,
        encode_delay: Duration,
        fail_encode_width: Option<u32>,
        encodes: AtomicUsize,
    }

    impl Codec for FakeCodec {
        fn decode(&self, bytes: &[u8]) -> Result<AnimatedImage, FitError> {
            bytes
                .first()
                .and_then(|key| self.images.get(key))
                .cloned()
                .ok_or_else(|| FitError::decode(PathBuf::new(), "unknown image"))
        }

        fn encode(&self, image: &AnimatedImage) -> Result<Vec<u8>, FitError> {
            self.encodes.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.encode_delay);
            if self.fail_encode_width == Some(image.width) {
                return Err(FitError::encode("refused"));
            }
            Ok(vec![0; (image.width * image.height) as usize])
        }
    }

    /// In-memory files: path → (reported size, contents).
    #[derive(Default)]
    struct FakeStorage {
        files: HashMap<PathBuf, (u64, Vec<u8>)>,
        written: Mutex<Vec<PathBuf>>,
    }

    impl Storage for FakeStorage {
        fn byte_size(&self, path: &Path) -> Result<u64, FitError> {
            self.files.get(path).map(|(size, _)| *size).ok_or_else(|| FitError::Stat {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }

        fn read(&self, path: &Path) -> Result<Vec<u8>, FitError> {
            Ok(self.files.get(path).map(|(_, bytes)| bytes.clone()).unwrap_or_default())
        }

        fn write(&self, source: &Path, _bytes: &[u8]) -> Result<PathBuf, FitError> {
            let target = source.with_file_name("out.gif");
            self.written.lock().unwrap().push(source.to_path_buf());
            Ok(target)
        }
    }

    fn solid_image(width: u32, height: u32) -> AnimatedImage {
        let mut image = AnimatedImage::new(width, height, vec![Frame::filled(FrameRect::canvas(width, height), 0)]);
        image.global_palette = Some(Palette::new(vec![[10, 10, 10], [240, 240, 240]]));
        image
    }

    fn fake_codec(images: Vec<(u8, AnimatedImage)>) -> FakeCodec {
        FakeCodec {
            images: images.into_iter().collect(),
            encode_delay: Duration::ZERO,
            fail_encode_width: None,
            encodes: AtomicUsize::new(0),
        }
    }

    fn config(budget: SizeBudget) -> ProcessingConfig {
        ProcessingConfig {
            budget,
            frame_jobs: 2,
            ..ProcessingConfig::default()
        }
    }

    fn record(path: &str, image: AnimatedImage, original_size: u64) -> SourceRecord {
        SourceRecord {
            path: PathBuf::from(path),
            image,
            original_size,
        }
    }

    #[test]
    fn test_already_good_is_not_written() {
        let storage = Arc::new(FakeStorage::default());
        let codec = Arc::new(fake_codec(Vec::new()));
        let engine = ProcessingEngine::new(config(SizeBudget::default()), codec.clone(), storage.clone()).unwrap();

        let image = solid_image(100, 80);
        let reports = engine.process(vec![record("a.gif", image, 500)], |_| {});

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, RecordOutcome::AlreadyGood);
        assert!(storage.written.lock().unwrap().is_empty());
        assert_eq!(codec.encodes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oversized_image_is_saved_within_ceilings() {
        let storage = Arc::new(FakeStorage::default());
        let codec = Arc::new(fake_codec(Vec::new()));
        let engine = ProcessingEngine::new(config(SizeBudget::new(100, 100, 1_000_000)), codec, storage.clone()).unwrap();

        let reports = engine.process(vec![record("big.gif", solid_image(400, 200), 500)], |_| {});

        match &reports[0].outcome {
            RecordOutcome::Saved {
                final_width,
                final_height,
                final_size,
                refinements,
                ..
            } => {
                assert_eq!((*final_width, *final_height), (100, 50));
                assert_eq!(*final_size, 5_000);
                assert_eq!(*refinements, 0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(reports[0].original_canvas, Some((400, 200)));
        assert_eq!(storage.written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_admission_is_bounded() {
        let storage = Arc::new(FakeStorage::default());
        let mut codec = fake_codec(Vec::new());
        codec.encode_delay = Duration::from_millis(20);
        let engine = ProcessingEngine::new(config(SizeBudget::new(50, 50, u64::MAX)), Arc::new(codec), storage).unwrap();

        let records = (0..5)
            .map(|n| record(&format!("{}.gif", n), solid_image(120, 60), 10))
            .collect();
        let completed = AtomicUsize::new(0);
        let reports = engine.process(records, |_| {
            completed.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(reports.len(), 5);
        assert_eq!(completed.load(Ordering::SeqCst), 5);
        assert!(engine.gate().peak() <= 4, "peak = {}", engine.gate().peak());
        assert!(engine.gate().peak() >= 1);
        assert_eq!(engine.gate().active(), 0);
        assert!(reports.iter().all(|r| matches!(r.outcome, RecordOutcome::Saved { .. })));
    }

    #[test]
    fn test_zero_workers_selects_default_limit() {
        let storage = Arc::new(FakeStorage::default());
        let engine = ProcessingEngine::new(
            ProcessingConfig {
                max_concurrent_images: 0,
                ..config(SizeBudget::new(50, 50, u64::MAX))
            },
            Arc::new(fake_codec(Vec::new())),
            storage,
        )
        .unwrap();

        assert_eq!(engine.gate().limit(), batch::DEFAULT_MAX_CONCURRENT_IMAGES);
        assert_eq!(engine.images.workers(), batch::DEFAULT_MAX_CONCURRENT_IMAGES);

        let records = (0..3)
            .map(|n| record(&format!("{}.gif", n), solid_image(120, 60), 10))
            .collect();
        let reports = engine.process(records, |_| {});
        assert_eq!(reports.len(), 3);
        assert!(engine.gate().peak() <= batch::DEFAULT_MAX_CONCURRENT_IMAGES);
    }

    #[test]
    fn test_failure_does_not_abort_siblings() {
        let storage = Arc::new(FakeStorage::default());
        let mut codec = fake_codec(Vec::new());
        // 300x150 shrinks to 100x50, which this codec refuses; 200x300 lands at 67x100.
        codec.fail_encode_width = Some(100);
        let engine = ProcessingEngine::new(config(SizeBudget::new(100, 100, u64::MAX)), Arc::new(codec), storage).unwrap();

        let records = vec![
            record("ok1.gif", solid_image(200, 300), 10),
            record("bad.gif", solid_image(300, 150), 10),
            record("ok2.gif", solid_image(50, 50), 10),
        ];
        let reports = engine.process(records, |_| {});

        let paths: Vec<_> = reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("ok1.gif"), PathBuf::from("bad.gif"), PathBuf::from("ok2.gif")]);
        assert!(matches!(reports[0].outcome, RecordOutcome::Saved { .. }));
        assert!(matches!(
            reports[1].outcome,
            RecordOutcome::Failed {
                kind: ErrorKind::EncodeFailure,
                ..
            }
        ));
        assert_eq!(reports[2].outcome, RecordOutcome::AlreadyGood);
    }

    #[test]
    fn test_refinement_shrinks_until_under_budget() {
        let storage = Arc::new(FakeStorage::default());
        let codec = Arc::new(fake_codec(Vec::new()));
        let mut config = config(SizeBudget::new(1000, 1000, 2_000));
        config.fit.max_refinements = 5;
        let engine = ProcessingEngine::new(config, codec, storage).unwrap();

        // The first estimate stops at the 64 px floor: 4096 fake bytes, over the 2000 budget.
        let reports = engine.process(vec![record("r.gif", solid_image(100, 100), 10_000)], |_| {});
        match &reports[0].outcome {
            RecordOutcome::Saved {
                final_size,
                refinements,
                ..
            } => {
                assert!(*final_size <= 2_000, "final size {}", final_size);
                assert!(*refinements >= 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_run_reports_load_failures_in_place() {
        let mut storage = FakeStorage::default();
        storage.files.insert(PathBuf::from("good.gif"), (10, vec![1]));
        storage.files.insert(PathBuf::from("corrupt.gif"), (10, vec![9]));
        let codec = fake_codec(vec![(1, solid_image(20, 20))]);
        let engine =
            ProcessingEngine::new(config(SizeBudget::default()), Arc::new(codec), Arc::new(storage)).unwrap();

        let paths = vec![
            PathBuf::from("missing.gif"),
            PathBuf::from("good.gif"),
            PathBuf::from("corrupt.gif"),
        ];
        let seen = AtomicUsize::new(0);
        let reports = engine.run(&paths, |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(reports.len(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert!(matches!(
            reports[0].outcome,
            RecordOutcome::Failed {
                kind: ErrorKind::StatFailure,
                ..
            }
        ));
        assert_eq!(reports[1].outcome, RecordOutcome::AlreadyGood);
        match &reports[2].outcome {
            RecordOutcome::Failed { kind, message } => {
                assert_eq!(*kind, ErrorKind::DecodeFailure);
                assert!(message.contains("corrupt.gif"), "{}", message);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_end_to_end_with_gif_codec() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("wide.gif");
        let codec = GifCodec::new();
        let bytes = codec.encode(&solid_image(300, 100)).unwrap();
        std::fs::write(&source, &bytes).unwrap();

        let storage = crate::storage::FsStorage::default();
        let engine = ProcessingEngine::new(
            config(SizeBudget::new(150, 150, 5_242_880)),
            Arc::new(codec),
            Arc::new(storage),
        )
        .unwrap();

        let reports = engine.run(&[source.clone()], |_| {});
        let RecordOutcome::Saved { output_path, .. } = &reports[0].outcome else {
            panic!("unexpected outcome {:?}", reports[0].outcome);
        };
        assert_eq!(output_path, &dir.path().join("WeChat_wide.gif"));

        let written = GifCodec::new().decode(&std::fs::read(output_path).unwrap()).unwrap();
        assert_eq!((written.width, written.height), (150, 50));
        assert!(is_acceptable(&written, 0, &SizeBudget::new(150, 150, 5_242_880)));
    }

    #[test]
    fn test_discover_gifs_in_directory_mode() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["b.gif", "a.GIF", "WeChat_a.gif", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.gif"), b"x").unwrap();

        let engine = ProcessingEngine::new(
            config(SizeBudget::default()),
            Arc::new(GifCodec::new()),
            Arc::new(FakeStorage::default()),
        )
        .unwrap();

        let inputs = vec![dir.path().to_path_buf()];
        let found = engine.discover_gifs(&inputs, true).unwrap();
        assert_eq!(found, vec![dir.path().join("a.GIF"), dir.path().join("b.gif")]);

        // Without directory mode the directory is skipped.
        assert!(engine.discover_gifs(&inputs, false).unwrap().is_empty());
    }

    #[test]
    fn test_discover_gifs_recursive() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.gif"), b"x").unwrap();

        let engine = ProcessingEngine::new(
            ProcessingConfig {
                recursive: true,
                ..config(SizeBudget::default())
            },
            Arc::new(GifCodec::new()),
            Arc::new(FakeStorage::default()),
        )
        .unwrap();

        let found = engine.discover_gifs(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(found, vec![dir.path().join("nested").join("c.gif")]);
    }
}
