//! # Palette Quantization
//!
//! The actual pixelation algorithm: extract a colour palette from a frame,
//! then redraw the frame as palette-quantized blocks with optional ordered
//! dithering between the two nearest palette colours.

pub mod distance;
pub mod extract;
pub mod quantize;
pub mod types;

pub use distance::DistanceAlgorithm;
pub use extract::extract_palette;
pub use quantize::quantize_frame;
pub use types::{OutputSettings, PaletteSettings};

/// Find the divisor of `number` closest to `target`.
///
/// Block and chunk sizes must divide the image dimensions evenly, so
/// user-supplied sizes are snapped to the nearest factor.
pub fn get_closest_factor(target: u32, number: u32) -> u32 {
    for i in 0..number {
        if number % (target + i) == 0 {
            return target + i;
        } else if target > i && number % (target - i) == 0 {
            return target - i;
        }
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_factor_is_kept() {
        assert_eq!(get_closest_factor(8, 64), 8);
        assert_eq!(get_closest_factor(1, 17), 1);
    }

    #[test]
    fn test_snaps_to_nearest_factor() {
        // 100 has factors 1, 2, 4, 5, 10, 20, 25, 50, 100
        assert_eq!(get_closest_factor(6, 100), 5);
        assert_eq!(get_closest_factor(9, 100), 10);
    }

    #[test]
    fn test_target_larger_than_number() {
        // Prime: only 1 and itself divide it
        assert_eq!(get_closest_factor(30, 31), 31);
    }
}
