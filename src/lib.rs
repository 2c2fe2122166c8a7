pub mod commands;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod gfycat;
pub mod timespec;

// Re-export commonly used types at the crate root for convenience
pub use config::Config;
pub use error::{ClipError, ClipResult};
pub use ffmpeg::FFmpeg;
pub use gfycat::{GfycatClient, Identity, UploadOutcome};
pub use timespec::{validate, ClipRange, TimeSpec};
