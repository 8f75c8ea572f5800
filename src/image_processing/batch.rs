use anyhow::{Context, Result};
use rayon::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default number of images fitted at the same time.
pub const DEFAULT_MAX_CONCURRENT_IMAGES: usize = 4;

/// Images allowed in flight for a requested `limit`; 0 selects the default.
pub fn concurrency_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_MAX_CONCURRENT_IMAGES
    } else {
        limit
    }
}

/// Batch processing statistics and progress tracking
pub struct BatchProcessor {
    pub total_files: usize,
    pub processed_count: AtomicUsize,
    pub start_time: Instant,
}

impl BatchProcessor {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            processed_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Increment processed count and return current count
    pub fn increment(&self) -> usize {
        self.processed_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_files == 0 {
            1.0
        } else {
            (self.processed_count.load(Ordering::Relaxed) as f64) / (self.total_files as f64)
        }
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Option<Duration> {
        let processed = self.processed_count.load(Ordering::Relaxed);
        if processed == 0 {
            return None;
        }

        let remaining = self.total_files.saturating_sub(processed);
        if remaining == 0 {
            return Some(Duration::ZERO);
        }

        let time_per_item = self.start_time.elapsed() / processed as u32;
        Some(time_per_item * remaining as u32)
    }
}

#[derive(Debug, Default)]
struct GateState {
    active: usize,
    peak: usize,
}

/// Counting semaphore limiting how many images are in the fitting stage.
///
/// Acquisition blocks until a slot frees up. Active and peak permit counts
/// are tracked so callers can observe the bound.
#[derive(Debug)]
pub struct AdmissionGate {
    limit: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

impl AdmissionGate {
    /// A limit of 0 selects [`DEFAULT_MAX_CONCURRENT_IMAGES`].
    pub fn new(limit: usize) -> Self {
        Self {
            limit: concurrency_limit(limit),
            state: Mutex::new(GateState::default()),
            released: Condvar::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Block until a slot is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while state.active >= self.limit {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.active += 1;
        state.peak = state.peak.max(state.active);
        Permit { gate: self }
    }

    pub fn active(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).active
    }

    /// Highest number of permits held at once since creation.
    pub fn peak(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).peak
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = state.active.saturating_sub(1);
        drop(state);
        self.released.notify_one();
    }
}

/// A held slot of an [`AdmissionGate`], returned on drop.
#[must_use = "the slot is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// Rayon pool for image-level work, fronted by an [`AdmissionGate`].
///
/// Permits are taken on the calling thread before a record is spawned, so
/// pool workers never block on the gate. A worker waiting on per-frame work
/// may pick up another spawned record; that record already holds its permit.
pub struct ImagePool {
    pool: ThreadPool,
    gate: AdmissionGate,
}

impl ImagePool {
    pub fn new(limit: usize) -> Result<Self> {
        let limit = concurrency_limit(limit);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(limit)
            .thread_name(|index| format!("image-worker-{}", index))
            .build()
            .context("Failed to initialize image thread pool")?;

        Ok(Self {
            pool,
            gate: AdmissionGate::new(limit),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Apply `f` to every item, each admitted with its own permit.
    ///
    /// Results come back in input order.
    pub fn run<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T, Permit<'_>) -> R + Sync,
    {
        let mut results: Vec<Option<R>> = items.iter().map(|_| None).collect();
        let jobs = items.into_iter().zip(results.iter_mut());
        let f = &f;
        let gate = &self.gate;

        self.pool.in_place_scope(move |scope| {
            for (item, slot) in jobs {
                let permit = gate.acquire();
                scope.spawn(move |_| *slot = Some(f(item, permit)));
            }
        });

        results.into_iter().flatten().collect()
    }
}
