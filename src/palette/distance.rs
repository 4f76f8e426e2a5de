use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Colour distance metric used for palette extraction and quantization.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceAlgorithm {
    Euclidean,
    Manhattan,
    Product,
    Brightness,
    Luminance,
    SlowLuminance,
}

pub const ALL_ALGORITHMS: &[DistanceAlgorithm] = &[
    DistanceAlgorithm::Euclidean,
    DistanceAlgorithm::Manhattan,
    DistanceAlgorithm::Product,
    DistanceAlgorithm::Brightness,
    DistanceAlgorithm::Luminance,
    DistanceAlgorithm::SlowLuminance,
];

impl DistanceAlgorithm {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Product => "product",
            Self::Brightness => "brightness",
            Self::Luminance => "luminance",
            Self::SlowLuminance => "slow_luminance",
        }
    }

    /// Closeness thresholds are entered on a linear scale; squared metrics
    /// need the threshold squared to compare like with like.
    pub const fn standardise_closeness_threshold(self, n: u32) -> u32 {
        match self {
            Self::Euclidean | Self::Product => n * n,
            Self::Manhattan | Self::Brightness | Self::Luminance | Self::SlowLuminance => n,
        }
    }

    pub const fn distance(self, a: [u8; 3], b: [u8; 3]) -> u32 {
        #[inline]
        const fn euclidean([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            let dr = r.abs_diff(cr) as u32;
            let dg = g.abs_diff(cg) as u32;
            let db = b.abs_diff(cb) as u32;

            dr.pow(2) + dg.pow(2) + db.pow(2)
        }

        #[inline]
        const fn manhattan([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            let dr = r.abs_diff(cr) as u32;
            let dg = g.abs_diff(cg) as u32;
            let db = b.abs_diff(cb) as u32;

            dr + dg + db
        }

        #[inline]
        const fn product([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            (r as u32 * g as u32 * b as u32).abs_diff(cr as u32 * cg as u32 * cb as u32)
        }

        #[inline]
        const fn brightness([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            (r as u32 + g as u32 + b as u32).abs_diff(cr as u32 + cg as u32 + cb as u32) / 3
        }

        // https://stackoverflow.com/questions/596216/formula-to-determine-perceived-brightness-of-rgb-color
        #[inline]
        const fn luminance([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            let lum_a =
                ((r as u32) * 1063 / 5000) + ((g as u32) * 447 / 625) + ((b as u32) * 361 / 5000);
            let lum_b = ((cr as u32) * 1063 / 5000)
                + ((cg as u32) * 447 / 625)
                + ((cb as u32) * 361 / 5000);

            lum_a.abs_diff(lum_b)
        }

        #[inline]
        const fn slow_luminance([r, g, b]: [u8; 3], [cr, cg, cb]: [u8; 3]) -> u32 {
            let lum_a = ((r as u32).pow(2) * 299 / 1000)
                + ((g as u32).pow(2) * 587 / 1000)
                + ((b as u32).pow(2) * 57 / 500);
            let lum_b = ((cr as u32).pow(2) * 299 / 1000)
                + ((cg as u32).pow(2) * 587 / 1000)
                + ((cb as u32).pow(2) * 57 / 500);

            (lum_a.isqrt()).abs_diff(lum_b.isqrt())
        }

        match self {
            Self::Euclidean => euclidean(a, b),
            Self::Manhattan => manhattan(a, b),
            Self::Product => product(a, b),
            Self::Brightness => brightness(a, b),
            Self::Luminance => luminance(a, b),
            Self::SlowLuminance => slow_luminance(a, b),
        }
    }
}

impl Display for DistanceAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DistanceAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "euclidean" => Ok(Self::Euclidean),
            "manhattan" => Ok(Self::Manhattan),
            "product" => Ok(Self::Product),
            "brightness" => Ok(Self::Brightness),
            "luminance" => Ok(Self::Luminance),
            "slow_luminance" | "slowluminance" => Ok(Self::SlowLuminance),
            other => Err(format!(
                "unknown distance algorithm '{other}', expected one of: euclidean, manhattan, product, brightness, luminance, slow_luminance"
            )),
        }
    }
}
