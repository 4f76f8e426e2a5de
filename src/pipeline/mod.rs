//! # Pixelation Pipeline
//!
//! Orchestrates the conversion: probe the input, decode frames, quantize
//! each one, and reassemble the output video.

pub mod engine;
pub mod staging;

pub use engine::PixelationEngine;
pub use staging::StagingDirs;
