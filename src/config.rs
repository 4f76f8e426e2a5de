use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    palette::{DistanceAlgorithm, OutputSettings, PaletteSettings},
    video::EncoderParams,
};

/// Main configuration for pixvid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video decode/encode settings
    pub video: VideoConfig,

    /// Palette extraction settings
    pub palette: PaletteConfig,

    /// Quantized output settings
    pub output: OutputSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig::default(),
            palette: PaletteConfig::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.palette.validate()?;
        validate_output(&self.output)?;
        Ok(())
    }
}

/// Video processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Encoder parameters for the output video
    pub encoder: EncoderParams,

    /// Carry the source audio track over into the output
    pub keep_audio: bool,

    /// Number of parallel frame-processing threads
    pub processing_threads: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderParams::default(),
            keep_audio: false,
            processing_threads: num_cpus::get(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.encoder.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.encoder.quality".to_string(),
                value: self.encoder.quality.to_string(),
            }
            .into());
        }

        if self.encoder.codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "video.encoder.codec".to_string(),
                value: String::new(),
            }
            .into());
        }

        if self.processing_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.processing_threads".to_string(),
                value: self.processing_threads.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Palette extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Grid chunks along each dimension during extraction
    pub chunks_per_dimension: u32,

    /// Minimum distance between palette colours (linear scale)
    pub closeness_threshold: u32,

    /// Colour distance metric
    pub algorithm: DistanceAlgorithm,

    /// Whether each frame gets its own palette or all frames share one
    pub mode: PaletteMode,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let settings = PaletteSettings::default();
        Self {
            chunks_per_dimension: settings.chunks_per_dimension,
            closeness_threshold: settings.closeness_threshold,
            algorithm: DistanceAlgorithm::Euclidean,
            mode: PaletteMode::PerFrame,
        }
    }
}

impl PaletteConfig {
    pub fn settings(&self) -> PaletteSettings {
        PaletteSettings {
            chunks_per_dimension: self.chunks_per_dimension,
            closeness_threshold: self.closeness_threshold,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunks_per_dimension == 0 {
            return Err(ConfigError::InvalidValue {
                key: "palette.chunks_per_dimension".to_string(),
                value: self.chunks_per_dimension.to_string(),
            }
            .into());
        }

        if self.closeness_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "palette.closeness_threshold".to_string(),
                value: self.closeness_threshold.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn validate_output(output: &OutputSettings) -> Result<()> {
    if output.pixel_size == 0 {
        return Err(ConfigError::InvalidValue {
            key: "output.pixel_size".to_string(),
            value: output.pixel_size.to_string(),
        }
        .into());
    }

    if output.dithering_likelihood == 0 {
        return Err(ConfigError::InvalidValue {
            key: "output.dithering_likelihood".to_string(),
            value: output.dithering_likelihood.to_string(),
        }
        .into());
    }

    if output.dithering_scale == 0 || output.dithering_scale > output.pixel_size {
        return Err(ConfigError::InvalidValue {
            key: "output.dithering_scale".to_string(),
            value: format!(
                "{} (must be between 1 and pixel_size {})",
                output.dithering_scale, output.pixel_size
            ),
        }
        .into());
    }

    Ok(())
}

/// Palette sharing strategy across the frames of a video.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    /// Extract a fresh palette for every frame
    PerFrame,

    /// Extract one palette from the middle frame and share it, trading
    /// per-frame colour fidelity for temporal stability
    Global,
}

impl Display for PaletteMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerFrame => write!(f, "per_frame"),
            Self::Global => write!(f, "global"),
        }
    }
}

impl FromStr for PaletteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "per_frame" | "perframe" => Ok(Self::PerFrame),
            "global" => Ok(Self::Global),
            other => Err(format!(
                "unknown palette mode '{other}', expected 'per_frame' or 'global'"
            )),
        }
    }
}
