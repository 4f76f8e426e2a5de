use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tokio::task;
use tracing::{debug, info};

use crate::{
    config::{Config, PaletteMode},
    error::{PipelineError, Result, VideoError},
    palette::{extract_palette, quantize_frame, DistanceAlgorithm, OutputSettings, PaletteSettings},
    pipeline::staging::StagingDirs,
    video::{probe, probe_video, Frame, FrameExtractor, VideoEncoder},
};

/// Main engine that turns a video into its pixelated rendition.
///
/// The pipeline runs in fixed stages:
/// 1. Probe - read dimensions and frame rate from the input
/// 2. Decode - extract every frame as a numbered image
/// 3. Pixelate - palette-quantize each frame
/// 4. Encode - reassemble the quantized frames at the source frame rate
/// 5. Cleanup - remove the staging directories
///
/// Decoding finishes before pixelation starts and encoding only sees the
/// complete quantized sequence; within the pixelation stage frames are
/// independent and processed in parallel.
pub struct PixelationEngine {
    config: Config,
}

impl PixelationEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Convert `input` into a pixelated video at `output`.
    pub async fn run<P: AsRef<Path>>(&self, input: P, output: P) -> Result<()> {
        let input = input.as_ref();
        let output = output.as_ref();

        self.config.validate()?;
        check_tools()?;

        info!("Starting pixelation pipeline");
        info!("   Input: {:?}", input);
        info!("   Output: {:?}", output);
        info!("   Algorithm: {}", self.config.palette.algorithm);
        info!("   Palette mode: {}", self.config.palette.mode);

        // Stage 1: probe
        let metadata = probe_video(input).await?;
        info!(
            "   Source: {}x{} @ {:.3} fps",
            metadata.width, metadata.height, metadata.fps
        );

        let mut staging = StagingDirs::new()?;

        // Stage 2: decode
        let frames = FrameExtractor::extract_frames(input, staging.raw()).await?;

        // Stage 3: pixelate
        let shared_palette = self.build_shared_palette(&frames)?;
        let processed = self
            .pixelate_frames(frames.clone(), staging.pixelated().to_path_buf(), shared_palette)
            .await?;

        if processed != frames.len() {
            return Err(PipelineError::OutputFailed {
                reason: format!(
                    "decoded {} frames but produced {} pixelated frames",
                    frames.len(),
                    processed
                ),
            }
            .into());
        }

        // Stage 4: encode
        let encoder = VideoEncoder::new(self.config.video.encoder.clone());
        if self.config.video.keep_audio {
            let video_only = staging.root().join("video_only.mp4");
            encoder
                .encode_frames(staging.pixelated(), metadata.fps, video_only.as_path())
                .await?;
            encoder.mux_audio(video_only.as_path(), input, output).await?;
        } else {
            encoder
                .encode_frames(staging.pixelated(), metadata.fps, output)
                .await?;
        }

        // Stage 5: cleanup
        staging.cleanup();

        info!("Pixelation complete! Output saved to: {:?}", output);
        Ok(())
    }

    /// In global palette mode, extract one palette from the middle frame.
    fn build_shared_palette(&self, frames: &[PathBuf]) -> Result<Option<Vec<[u8; 3]>>> {
        if self.config.palette.mode != PaletteMode::Global {
            return Ok(None);
        }

        let reference = &frames[frames.len() / 2];
        info!("Extracting shared palette from {:?}", reference);

        let frame = Frame::open(reference)?;
        let palette = extract_palette(
            &frame,
            self.config.palette.settings(),
            self.config.palette.algorithm,
        )?;

        info!("Shared palette has {} colours", palette.len());
        Ok(Some(palette))
    }

    /// Quantize every decoded frame into `out_dir`, preserving numbering.
    async fn pixelate_frames(
        &self,
        frames: Vec<PathBuf>,
        out_dir: PathBuf,
        shared_palette: Option<Vec<[u8; 3]>>,
    ) -> Result<usize> {
        let total = frames.len();
        info!("Pixelating {} frames on {} threads", total, self.config.video.processing_threads);

        let palette_settings = self.config.palette.settings();
        let algorithm = self.config.palette.algorithm;
        let output_settings = self.config.output;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.video.processing_threads)
            .build()
            .map_err(|e| PipelineError::WorkerPoolFailed {
                reason: e.to_string(),
            })?;

        let processed = task::spawn_blocking(move || -> Result<usize> {
            let done = AtomicUsize::new(0);

            pool.install(|| {
                frames.par_iter().try_for_each(|path| -> Result<()> {
                    pixelate_one(
                        path,
                        &out_dir,
                        shared_palette.as_deref(),
                        palette_settings,
                        algorithm,
                        output_settings,
                    )?;

                    let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 100 == 0 {
                        info!("Pixelated {}/{} frames", count, total);
                    }
                    Ok(())
                })
            })?;

            Ok(done.into_inner())
        })
        .await
        .map_err(|e| PipelineError::OutputFailed {
            reason: format!("frame worker task failed: {e}"),
        })??;

        info!("Pixelated all {} frames", processed);
        Ok(processed)
    }
}

/// Quantize a single staged frame and write it under the same name.
fn pixelate_one(
    path: &Path,
    out_dir: &Path,
    shared_palette: Option<&[[u8; 3]]>,
    palette_settings: PaletteSettings,
    algorithm: DistanceAlgorithm,
    output_settings: OutputSettings,
) -> Result<()> {
    let frame = Frame::open(path)?;

    let own_palette;
    let palette = match shared_palette {
        Some(palette) => palette,
        None => {
            own_palette = extract_palette(&frame, palette_settings, algorithm)?;
            &own_palette
        }
    };

    let quantized = quantize_frame(&frame, palette, algorithm, output_settings)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| VideoError::FrameProcessingFailed {
            reason: format!("staged frame has no file name: {}", path.display()),
        })?;

    let out_path = out_dir.join(file_name);
    quantized.save_png(&out_path)?;

    debug!("Pixelated {:?} ({} palette colours)", file_name, palette.len());
    Ok(())
}

/// Both external collaborators must be on PATH before any work starts.
fn check_tools() -> Result<()> {
    if !FrameExtractor::check_ffmpeg_available() {
        return Err(VideoError::ToolFailed {
            tool: "ffmpeg".to_string(),
            reason: "not found on PATH. Please install FFmpeg.".to_string(),
        }
        .into());
    }

    if !probe::check_ffprobe_available() {
        return Err(VideoError::ToolFailed {
            tool: "ffprobe".to_string(),
            reason: "not found on PATH. Please install FFmpeg.".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::extractor::list_frames;

    fn stage_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("frame_{i:06}.png"));
                let shade = (i * 40) as u8;
                Frame::new_filled(32, 32, [shade, shade, shade])
                    .save_png(&path)
                    .unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pixelate_frames_produces_one_output_per_input() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let frames = stage_frames(raw.path(), 3);

        let engine = PixelationEngine::new(Config::default());
        let processed = engine
            .pixelate_frames(frames, out.path().to_path_buf(), None)
            .await
            .unwrap();

        assert_eq!(processed, 3);

        let outputs = list_frames(out.path()).unwrap();
        assert_eq!(outputs.len(), 3);

        // Numbering survives, so encode order equals decode order
        assert!(outputs[0].ends_with("frame_000001.png"));
        assert!(outputs[2].ends_with("frame_000003.png"));
    }

    #[tokio::test]
    async fn test_pixelate_frames_with_shared_palette() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let frames = stage_frames(raw.path(), 2);

        let palette = vec![[0, 0, 0], [255, 255, 255]];
        let engine = PixelationEngine::new(Config::default());
        let processed = engine
            .pixelate_frames(frames, out.path().to_path_buf(), Some(palette))
            .await
            .unwrap();

        assert_eq!(processed, 2);

        // Every output pixel must come from the shared palette
        for path in list_frames(out.path()).unwrap() {
            let frame = Frame::open(&path).unwrap();
            for y in 0..frame.height() {
                for x in 0..frame.width() {
                    let px = frame.get_pixel(x, y);
                    assert!(px == [0, 0, 0] || px == [255, 255, 255]);
                }
            }
        }
    }

    #[test]
    fn test_shared_palette_only_in_global_mode() {
        let raw = tempfile::tempdir().unwrap();
        let frames = stage_frames(raw.path(), 3);

        let mut config = Config::default();
        config.palette.mode = PaletteMode::PerFrame;
        let engine = PixelationEngine::new(config);
        assert!(engine.build_shared_palette(&frames).unwrap().is_none());

        let mut config = Config::default();
        config.palette.mode = PaletteMode::Global;
        let engine = PixelationEngine::new(config);
        let palette = engine.build_shared_palette(&frames).unwrap().unwrap();
        assert!(!palette.is_empty());
    }
}
