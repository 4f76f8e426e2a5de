//! # Video Module
//!
//! The external-tool boundary: probing input streams with ffprobe, decoding
//! videos to numbered frame images and re-encoding frame sequences with
//! ffmpeg, plus the [`Frame`] type the quantizer operates on.

pub mod encoder;
pub mod extractor;
pub mod probe;
pub mod types;

use std::process::{Command, Output};

use tokio::task;

use crate::error::{Result, VideoError};

pub use encoder::VideoEncoder;
pub use extractor::FrameExtractor;
pub use probe::probe_video;
pub use types::{EncoderParams, Frame, VideoMetadata};

/// Run an external tool to completion off the async runtime.
///
/// Any failure is binary: a non-zero exit status aborts the run with the
/// tool's stderr attached.
pub(crate) async fn run_tool(mut cmd: Command, tool: &str) -> Result<Output> {
    let tool = tool.to_string();

    let output = task::spawn_blocking(move || cmd.output())
        .await
        .map_err(|e| VideoError::ToolFailed {
            tool: tool.clone(),
            reason: format!("failed to spawn process: {e}"),
        })?
        .map_err(|e| VideoError::ToolFailed {
            tool: tool.clone(),
            reason: format!("execution failed: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::ToolFailed {
            tool,
            reason: format!("exited with {}: {}", output.status, stderr.trim()),
        }
        .into());
    }

    Ok(output)
}
