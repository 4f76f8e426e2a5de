use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use pixvid::{
    config::{Config, PaletteMode},
    palette::DistanceAlgorithm,
    pipeline::PixelationEngine,
};

#[derive(Parser)]
#[command(
    name = "pixvid",
    version,
    about = "Convert videos into palette-quantized pixel-art renditions",
    long_about = "pixvid decodes a video into frames, redraws every frame as coarse blocks snapped to an extracted colour palette, and reassembles the result at the source frame rate. Requires FFmpeg on PATH."
)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path
    #[arg(short, long)]
    output: PathBuf,

    /// Edge length of one output block in pixels
    #[arg(short, long)]
    pixel_size: Option<u32>,

    /// Colour distance algorithm (euclidean, manhattan, product, brightness,
    /// luminance, slow_luminance)
    #[arg(short, long)]
    algorithm: Option<DistanceAlgorithm>,

    /// Grid chunks per dimension during palette extraction
    #[arg(long)]
    chunks_per_dimension: Option<u32>,

    /// Minimum distance between palette colours
    #[arg(long)]
    closeness_threshold: Option<u32>,

    /// Dithering reluctance (higher dithers more)
    #[arg(long)]
    dithering_likelihood: Option<u32>,

    /// Dither checkerboard sub-cells per block edge (1 disables dithering)
    #[arg(long)]
    dithering_scale: Option<u32>,

    /// Palette sharing across frames (per_frame, global)
    #[arg(long)]
    palette_mode: Option<PaletteMode>,

    /// Mux the source audio track into the output
    #[arg(long)]
    keep_audio: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Config file values first, then CLI flags override them.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => {
                info!("Loading configuration from {:?}", config_path);
                Config::from_file(config_path)?
            }
            None => Config::default(),
        };

        if let Some(pixel_size) = self.pixel_size {
            config.output.pixel_size = pixel_size;
        }
        if let Some(algorithm) = self.algorithm {
            config.palette.algorithm = algorithm;
        }
        if let Some(chunks) = self.chunks_per_dimension {
            config.palette.chunks_per_dimension = chunks;
        }
        if let Some(threshold) = self.closeness_threshold {
            config.palette.closeness_threshold = threshold;
        }
        if let Some(likelihood) = self.dithering_likelihood {
            config.output.dithering_likelihood = likelihood;
        }
        if let Some(scale) = self.dithering_scale {
            config.output.dithering_scale = scale;
        }
        if let Some(mode) = self.palette_mode {
            config.palette.mode = mode;
        }
        if self.keep_audio {
            config.video.keep_audio = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting pixvid v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.resolve_config()?;

    let engine = PixelationEngine::new(config);
    engine.run(&cli.input, &cli.output).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pixvid.toml");
        std::fs::write(
            &config_path,
            "[output]\npixel_size = 16\n\n[palette]\nchunks_per_dimension = 42\n",
        )
        .unwrap();

        let cli = parse(&[
            "pixvid",
            "--input",
            "in.mp4",
            "--output",
            "out.mp4",
            "--config",
            config_path.to_str().unwrap(),
            "--pixel-size",
            "4",
        ]);
        let config = cli.resolve_config().unwrap();

        // Flag beats file
        assert_eq!(config.output.pixel_size, 4);
        // Unset flags fall through to the file
        assert_eq!(config.palette.chunks_per_dimension, 42);
        // Values in neither place fall through to built-in defaults
        assert_eq!(
            config.palette.closeness_threshold,
            Config::default().palette.closeness_threshold
        );
    }

    #[test]
    fn test_defaults_without_config_file() {
        let cli = parse(&["pixvid", "-i", "a.mp4", "-o", "b.mp4"]);
        let config = cli.resolve_config().unwrap();

        let defaults = Config::default();
        assert_eq!(config.output.pixel_size, defaults.output.pixel_size);
        assert_eq!(config.palette.mode, defaults.palette.mode);
        assert!(!config.video.keep_audio);
    }

    #[test]
    fn test_flags_apply_without_config_file() {
        let cli = parse(&[
            "pixvid",
            "-i",
            "a.mp4",
            "-o",
            "b.mp4",
            "--algorithm",
            "manhattan",
            "--palette-mode",
            "global",
            "--keep-audio",
        ]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.palette.algorithm, DistanceAlgorithm::Manhattan);
        assert_eq!(config.palette.mode, PaletteMode::Global);
        assert!(config.video.keep_audio);
    }

    #[test]
    fn test_resolved_config_is_validated() {
        // Flag combinations that break invariants are rejected at resolution
        let cli = parse(&[
            "pixvid",
            "-i",
            "a.mp4",
            "-o",
            "b.mp4",
            "--pixel-size",
            "2",
            "--dithering-scale",
            "4",
        ]);
        assert!(cli.resolve_config().is_err());
    }
}
