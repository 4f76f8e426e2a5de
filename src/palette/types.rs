use serde::{Deserialize, Serialize};

/// Parameters controlling palette extraction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSettings {
    /// Number of grid chunks along each image dimension. Each chunk
    /// contributes at most one palette colour.
    pub chunks_per_dimension: u32,

    /// Minimum distance (linear scale) a candidate colour must keep from
    /// every colour already in the palette.
    pub closeness_threshold: u32,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            chunks_per_dimension: 100,
            closeness_threshold: 50,
        }
    }
}

/// Parameters controlling the quantized output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Edge length in pixels of one output block. Snapped to the nearest
    /// divisor of the frame width before use.
    pub pixel_size: u32,

    /// How reluctant dithering is: the runner-up colour is only used when the
    /// two candidate distances differ by less than 1/likelihood of the
    /// inter-candidate distance. Higher values dither more.
    pub dithering_likelihood: u32,

    /// Sub-cells per block edge used for the dither checkerboard. A scale of
    /// 1 disables dithering.
    pub dithering_scale: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pixel_size: 8,
            dithering_likelihood: 4,
            dithering_scale: 2,
        }
    }
}
