use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::{
    error::Result,
    video::{extractor::FRAME_PATTERN, run_tool, types::EncoderParams},
};

/// Reassembles a numbered PNG frame sequence into a video via external ffmpeg.
pub struct VideoEncoder {
    params: EncoderParams,
}

impl VideoEncoder {
    pub fn new(params: EncoderParams) -> Self {
        Self { params }
    }

    /// Encode the staged frame sequence in `frames_dir` to `output` at the
    /// given frame rate.
    pub async fn encode_frames<P: AsRef<Path>>(
        &self,
        frames_dir: P,
        fps: f64,
        output: P,
    ) -> Result<()> {
        let output = output.as_ref();

        info!(
            "Encoding frame sequence at {:.3} fps with {} (crf {})",
            fps,
            self.params.codec,
            Self::quality_to_crf(self.params.quality)
        );

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y")
            .arg("-framerate")
            .arg(format!("{fps}"))
            .arg("-i")
            .arg(frames_dir.as_ref().join(FRAME_PATTERN))
            .args(["-c:v", &self.params.codec])
            // yuv420p needs even dimensions; quantized frames may not have them
            .args(["-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2"])
            .args(["-pix_fmt", "yuv420p"])
            .args(["-crf", &Self::quality_to_crf(self.params.quality).to_string()])
            .arg(output);

        run_tool(cmd, "ffmpeg").await?;
        Ok(())
    }

    /// Copy the encoded video stream and mux in the audio track of `source`,
    /// if it has one.
    pub async fn mux_audio<P: AsRef<Path>>(&self, video: P, source: P, output: P) -> Result<()> {
        info!("Muxing source audio into output");

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y")
            .arg("-i")
            .arg(video.as_ref())
            .arg("-i")
            .arg(source.as_ref())
            .args(["-map", "0:v", "-map", "1:a?"])
            .args(["-c:v", "copy"])
            .args(["-c:a", "aac"])
            .arg("-shortest")
            .arg(output.as_ref());

        run_tool(cmd, "ffmpeg").await?;
        Ok(())
    }

    /// Map a 0-100 quality setting onto the encoder's 51-0 CRF scale.
    fn quality_to_crf(quality: u8) -> u8 {
        51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8
    }
}
