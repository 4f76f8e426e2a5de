use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{PaletteError, Result},
    palette::{get_closest_factor, DistanceAlgorithm, PaletteSettings},
    video::types::Frame,
};

/// Extract a representative colour palette from a frame.
///
/// The frame is split into a `chunks_per_dimension`-square grid. For each
/// chunk, the most common pixel that keeps at least `closeness_threshold`
/// distance from every colour chosen so far is added to the palette, so flat
/// regions contribute one colour instead of dozens of near-duplicates.
pub fn extract_palette(
    frame: &Frame,
    settings: PaletteSettings,
    dist_algo: DistanceAlgorithm,
) -> Result<Vec<[u8; 3]>> {
    let PaletteSettings {
        chunks_per_dimension,
        closeness_threshold,
    } = settings;

    let min_dimension = frame.width().min(frame.height());
    let chunks_per_dimension = get_closest_factor(chunks_per_dimension, min_dimension);
    let threshold = dist_algo.standardise_closeness_threshold(closeness_threshold);

    let (width_chunk_size, height_chunk_size) = (
        frame.width() / chunks_per_dimension,
        frame.height() / chunks_per_dimension,
    );

    let num_chunks = chunks_per_dimension * chunks_per_dimension;
    let mut palette: Vec<[u8; 3]> = Vec::with_capacity(num_chunks as usize);

    // Memoises the too-close verdict per colour; must be flushed whenever the
    // palette grows since old verdicts no longer hold.
    let mut too_close_cache: HashMap<[u8; 3], bool> = HashMap::new();

    for chunk_x in 0..chunks_per_dimension {
        for chunk_y in 0..chunks_per_dimension {
            let mut occurrences_of_suitably_far: HashMap<[u8; 3], u32> = HashMap::new();

            for px_x in (width_chunk_size * chunk_x)..(width_chunk_size * (chunk_x + 1)) {
                for px_y in (height_chunk_size * chunk_y)..(height_chunk_size * (chunk_y + 1)) {
                    let px = frame.get_pixel(px_x, px_y);

                    let too_close = match too_close_cache.entry(px) {
                        Entry::Occupied(occ) => *occ.get(),
                        Entry::Vacant(vac) => {
                            let mut too_close = false;
                            for chosen in palette.iter().copied() {
                                if dist_algo.distance(px, chosen) < threshold {
                                    too_close = true;
                                    break;
                                }
                            }

                            *vac.insert(too_close)
                        }
                    };

                    if !too_close {
                        *occurrences_of_suitably_far.entry(px).or_default() += 1;
                    }
                }
            }

            if let Some((most_common, _)) = occurrences_of_suitably_far
                .into_iter()
                .max_by_key(|(_, count)| *count)
            {
                palette.push(most_common);
                too_close_cache.clear();
            }
        }
    }

    if palette.is_empty() {
        return Err(PaletteError::EmptyPalette.into());
    }

    debug!(
        "Extracted {} palette colours from {} chunks",
        palette.len(),
        num_chunks
    );

    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, colour: [u8; 3]) -> Frame {
        Frame::new_filled(width, height, colour)
    }

    #[test]
    fn test_solid_frame_yields_single_colour() {
        let frame = solid_frame(64, 64, [200, 10, 10]);
        let palette = extract_palette(
            &frame,
            PaletteSettings {
                chunks_per_dimension: 4,
                closeness_threshold: 50,
            },
            DistanceAlgorithm::Euclidean,
        )
        .unwrap();

        assert_eq!(palette, vec![[200, 10, 10]]);
    }

    #[test]
    fn test_distinct_halves_yield_both_colours() {
        let mut frame = Frame::new_black(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                let colour = if x < 32 { [255, 0, 0] } else { [0, 0, 255] };
                frame.set_pixel(x, y, colour);
            }
        }

        let palette = extract_palette(
            &frame,
            PaletteSettings {
                chunks_per_dimension: 2,
                closeness_threshold: 50,
            },
            DistanceAlgorithm::Euclidean,
        )
        .unwrap();

        assert!(palette.contains(&[255, 0, 0]));
        assert!(palette.contains(&[0, 0, 255]));
    }

    #[test]
    fn test_near_duplicates_are_merged() {
        let mut frame = Frame::new_black(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                // Shades within a few units of each other
                let shade = 100 + (x % 4) as u8;
                frame.set_pixel(x, y, [shade, shade, shade]);
            }
        }

        let palette = extract_palette(
            &frame,
            PaletteSettings {
                chunks_per_dimension: 4,
                closeness_threshold: 50,
            },
            DistanceAlgorithm::Euclidean,
        )
        .unwrap();

        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_chunk_count_snaps_to_image_size() {
        // 60 is not divisible by 100; extraction must still succeed
        let frame = solid_frame(60, 60, [5, 5, 5]);
        let palette =
            extract_palette(&frame, PaletteSettings::default(), DistanceAlgorithm::Manhattan)
                .unwrap();
        assert_eq!(palette.len(), 1);
    }
}
