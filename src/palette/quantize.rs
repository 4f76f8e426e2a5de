use tracing::trace;

use crate::{
    error::{PaletteError, Result},
    palette::{get_closest_factor, DistanceAlgorithm, OutputSettings},
    video::types::Frame,
};

/// Redraw a frame as palette-quantized blocks.
///
/// Each `pixel_size`-square block is averaged, matched against the two
/// nearest palette colours, and rendered as a checkerboard of the winner and
/// the runner-up when their distances are close enough to warrant dithering.
/// The result is scaled back up so the output geometry tracks the input.
pub fn quantize_frame(
    frame: &Frame,
    palette: &[[u8; 3]],
    dist_algo: DistanceAlgorithm,
    settings: OutputSettings,
) -> Result<Frame> {
    let OutputSettings {
        pixel_size,
        dithering_likelihood,
        dithering_scale,
    } = settings;

    if palette.is_empty() {
        return Err(PaletteError::EmptyPalette.into());
    }

    let pixel_size = get_closest_factor(pixel_size, frame.width());
    // A dither cell can never be finer than the block it subdivides, and the
    // snapped pixel size may have dropped below the configured scale
    let dithering_scale = dithering_scale.min(pixel_size);
    let (width, height) = (frame.width(), frame.height());

    let (num_width_chunks, num_height_chunks) = (width / pixel_size, height / pixel_size);
    let (output_w, output_h) = if dithering_scale == 1 {
        (num_width_chunks, num_height_chunks)
    } else {
        (
            num_width_chunks * dithering_scale,
            num_height_chunks * dithering_scale,
        )
    };
    let mut output = Frame::new_black(output_w, output_h);

    trace!(
        "Quantizing {}x{} frame into {}x{} blocks of {}px",
        width,
        height,
        num_width_chunks,
        num_height_chunks,
        pixel_size
    );

    for chunk_x in 0..num_width_chunks {
        for chunk_y in 0..num_height_chunks {
            let (mut accum_r, mut accum_g, mut accum_b) = (0_u64, 0_u64, 0_u64);

            for px_x in (pixel_size * chunk_x)..(pixel_size * (chunk_x + 1)) {
                for px_y in (pixel_size * chunk_y)..(pixel_size * (chunk_y + 1)) {
                    let [r, g, b] = frame.get_pixel(px_x, px_y);
                    accum_r += r as u64;
                    accum_g += g as u64;
                    accum_b += b as u64;
                }
            }

            let divisor = (pixel_size * pixel_size) as u64;
            let average = [
                (accum_r / divisor) as u8,
                (accum_g / divisor) as u8,
                (accum_b / divisor) as u8,
            ];

            let (first, second) = nearest_two(palette, average, dist_algo);

            let second = match second {
                Some((second, second_distance)) if dithering_scale > 1 => {
                    let (first_colour, first_distance) = first;
                    let inter_candidate_distance = dist_algo.distance(first_colour, second);

                    // Only dither when the runner-up is genuinely competitive
                    if first_distance.abs_diff(second_distance)
                        > (inter_candidate_distance / dithering_likelihood.max(1))
                    {
                        first_colour
                    } else {
                        second
                    }
                }
                _ => first.0,
            };
            let first = first.0;

            for px_x in (dithering_scale * chunk_x)..(dithering_scale * (chunk_x + 1)) {
                for px_y in (dithering_scale * chunk_y)..(dithering_scale * (chunk_y + 1)) {
                    let mut should_dither = px_y % 2 == 0;
                    if px_x % 2 == 0 {
                        should_dither = !should_dither;
                    }

                    should_dither &= dithering_scale > 1;

                    output.set_pixel(px_x, px_y, if should_dither { first } else { second });
                }
            }
        }
    }

    // Scale the block grid back up towards the input geometry
    let scaling_factor = if dithering_scale == 1 {
        pixel_size
    } else {
        pixel_size / dithering_scale
    };

    let (final_w, final_h) = (output_w * scaling_factor, output_h * scaling_factor);
    let mut final_frame = Frame::new_black(final_w, final_h);

    for x in 0..output_w {
        for y in 0..output_h {
            let px = output.get_pixel(x, y);

            for px_x in (scaling_factor * x)..(scaling_factor * (x + 1)) {
                for px_y in (scaling_factor * y)..(scaling_factor * (y + 1)) {
                    final_frame.set_pixel(px_x, px_y, px);
                }
            }
        }
    }

    Ok(final_frame)
}

/// Linear scan for the two palette colours nearest to `target`.
fn nearest_two(
    palette: &[[u8; 3]],
    target: [u8; 3],
    dist_algo: DistanceAlgorithm,
) -> (([u8; 3], u32), Option<([u8; 3], u32)>) {
    let mut first: Option<([u8; 3], u32)> = None;
    let mut second: Option<([u8; 3], u32)> = None;

    for px in palette.iter().copied() {
        let dist = dist_algo.distance(px, target);

        match first {
            Some((_, first_distance)) if dist >= first_distance => {
                if second.map_or(true, |(_, d)| dist < d) {
                    second = Some((px, dist));
                }
            }
            _ => {
                second = first;
                first = Some((px, dist));
            }
        }
    }

    // Palette is non-empty, checked by the caller
    (first.unwrap(), second)
}
