use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::{
    error::{Result, VideoError},
    video::run_tool,
};

/// Filename pattern for staged frames, shared by the decoder and encoder so
/// the encoder consumes exactly the sequence the decoder produced.
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// Decodes a video into a numbered PNG frame sequence via external ffmpeg.
pub struct FrameExtractor;

impl FrameExtractor {
    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Decode every frame of `input` into `frames_dir` at the native frame
    /// rate. Returns the staged frame paths in sequence order.
    pub async fn extract_frames<P: AsRef<Path>>(
        input: P,
        frames_dir: P,
    ) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        let frames_dir = frames_dir.as_ref();

        if !input.exists() {
            return Err(VideoError::LoadFailed {
                path: input.display().to_string(),
            }
            .into());
        }

        info!("Decoding frames from {:?}", input);

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            // one output image per source frame, no duplication or dropping
            .args(["-vsync", "0"])
            .arg(frames_dir.join(FRAME_PATTERN));

        run_tool(cmd, "ffmpeg").await?;

        let frames = list_frames(frames_dir)?;
        if frames.is_empty() {
            return Err(VideoError::DecodingFailed {
                reason: format!("no frames decoded from {}", input.display()),
            }
            .into());
        }

        info!("Decoded {} frames", frames.len());
        Ok(frames)
    }
}

/// List staged frame images in sequence order.
pub fn list_frames<P: AsRef<Path>>(frames_dir: P) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(frames_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with("frame_") && name.ends_with(".png"))
                    .unwrap_or(false)
        })
        .collect();

    // Zero-padded numbering makes lexicographic order the sequence order
    frames.sort();

    debug!(
        "Found {} staged frames in {:?}",
        frames.len(),
        frames_dir.as_ref()
    );

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_list_frames_sorted_by_sequence() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_000010.png", "frame_000002.png", "frame_000001.png"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(
            names,
            vec!["frame_000001.png", "frame_000002.png", "frame_000010.png"]
        );
    }

    #[test]
    fn test_list_frames_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("frame_000001.png")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join("thumbnail.png")).unwrap();

        let frames = list_frames(dir.path()).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_list_frames_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_frames(dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_rejects_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist.mp4");

        let result = FrameExtractor::extract_frames(missing.as_path(), dir.path()).await;
        assert!(result.is_err());
    }
}
