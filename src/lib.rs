// Library exports for reuse by other front ends
pub mod cli;
pub mod codec;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod report;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use codec::{Codec, GifCodec};
pub use error::{ErrorKind, FitError};
pub use image_processing::constraints::SizeBudget;
pub use image_processing::fit::{FitOptions, SizeFitter};
pub use image_processing::quantize::DitherMethod;
pub use image_processing::{ProcessingConfig, ProcessingEngine, RecordOutcome, RecordReport};
pub use json_output::JsonMessage;
pub use storage::{FsStorage, Storage};
