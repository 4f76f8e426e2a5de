//! # pixvid
//!
//! Convert videos into palette-quantized pixel-art renditions.
//!
//! A video is decoded into individual frames, each frame is redrawn as
//! coarse blocks snapped to an extracted colour palette (with optional
//! ordered dithering between the two nearest palette colours), and the
//! frames are reassembled into a video at the source frame rate. Decoding
//! and encoding shell out to FFmpeg; the pixelation itself runs in-process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixvid::{config::Config, pipeline::PixelationEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = PixelationEngine::new(Config::default());
//! engine.run("input.mp4", "output.mp4").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`palette`] - Palette extraction and block quantization
//! - [`video`] - FFmpeg probing, frame decoding and encoding
//! - [`pipeline`] - The stage-by-stage conversion engine
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod palette;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{PixvidError, Result},
    palette::DistanceAlgorithm,
    pipeline::PixelationEngine,
};
