use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::{
    error::{Result, VideoError},
    video::{run_tool, types::VideoMetadata},
};

/// Check whether ffprobe can be executed.
pub fn check_ffprobe_available() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Probe the first video stream of `input` for dimensions and frame rate.
pub async fn probe_video<P: AsRef<Path>>(input: P) -> Result<VideoMetadata> {
    let input = input.as_ref();

    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height,r_frame_rate",
        "-of",
        "csv=p=0",
    ])
    .arg(input);

    let output = run_tool(cmd, "ffprobe").await?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    let metadata = parse_probe_output(stdout.trim()).ok_or_else(|| VideoError::ProbeFailed {
        reason: format!(
            "could not parse stream properties of {}: {:?}",
            input.display(),
            stdout.trim()
        ),
    })?;

    debug!(
        "Probed {}: {}x{} @ {:.3} fps",
        input.display(),
        metadata.width,
        metadata.height,
        metadata.fps
    );

    Ok(metadata)
}

/// Parse a `width,height,r_frame_rate` CSV line as emitted by ffprobe.
fn parse_probe_output(line: &str) -> Option<VideoMetadata> {
    let mut fields = line.split(',');

    let width = fields.next()?.trim().parse().ok()?;
    let height = fields.next()?.trim().parse().ok()?;
    let fps = parse_frame_rate(fields.next()?.trim())?;

    Some(VideoMetadata { width, height, fps })
}

/// Parse an ffprobe rational frame rate such as `30/1` or `30000/1001`.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.parse().ok()?,
    };

    (fps.is_finite() && fps > 0.0).then_some(fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
    }

    #[test]
    fn test_parse_ntsc_frame_rate() {
        let fps = parse_frame_rate("30000/1001").unwrap();
        assert!((fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_reject_bad_frame_rates() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("30/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
        assert_eq!(parse_frame_rate("-24/1"), None);
    }

    #[test]
    fn test_parse_probe_output() {
        let meta = parse_probe_output("1920,1080,24000/1001").unwrap();
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert!((meta.fps - 23.976).abs() < 0.001);
    }

    #[test]
    fn test_parse_probe_output_rejects_garbage() {
        assert!(parse_probe_output("").is_none());
        assert!(parse_probe_output("1920,1080").is_none());
        assert!(parse_probe_output("w,h,30/1").is_none());
    }
}
