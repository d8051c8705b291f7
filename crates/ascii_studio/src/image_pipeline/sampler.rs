use crate::color::Rgb;

use super::adjust::ToneFilter;
use super::geometry::Placement;
use super::source::SourceImage;

/// Rasterize the placed, filtered source into a `cols x rows` RGBA buffer.
///
/// RGB holds the image composited over `background`; A holds how much of the
/// pixel the image covers (source alpha times geometric coverage). Each grid
/// pixel averages `samples_per_axis^2` nearest-neighbour taps.
pub fn rasterize<S: SourceImage + ?Sized>(
    source: &S,
    placement: &Placement,
    filter: &ToneFilter,
    background: Rgb,
    cols: u32,
    rows: u32,
    samples_per_axis: u32,
) -> Vec<[u8; 4]> {
    let (source_width, source_height) = source.dimensions();
    let samples_per_axis = samples_per_axis.max(1);
    let taps = f64::from(samples_per_axis * samples_per_axis);
    let step = 1.0 / f64::from(samples_per_axis);

    if source_width == 0 || source_height == 0 {
        let [r, g, b] = background.to_array();
        return vec![[r, g, b, 0]; cols as usize * rows as usize];
    }

    let mut buffer = Vec::with_capacity(cols as usize * rows as usize);

    for y in 0..rows {
        for x in 0..cols {
            // Premultiplied sums.
            let mut sum = [0.0f64; 3];
            let mut alpha = 0.0f64;

            for sy in 0..samples_per_axis {
                for sx in 0..samples_per_axis {
                    let gx = f64::from(x) + (f64::from(sx) + 0.5) * step;
                    let gy = f64::from(y) + (f64::from(sy) + 0.5) * step;

                    let Some((u, v)) =
                        placement.source_point(gx, gy, source_width, source_height)
                    else {
                        continue;
                    };

                    let px = (u.floor() as u32).min(source_width - 1);
                    let py = (v.floor() as u32).min(source_height - 1);
                    let [r, g, b, a] = source.pixel(px, py);
                    let [r, g, b] = filter.apply_rgb([r, g, b]);

                    let weight = f64::from(a) / 255.0;
                    sum[0] += f64::from(r) * weight;
                    sum[1] += f64::from(g) * weight;
                    sum[2] += f64::from(b) * weight;
                    alpha += weight;
                }
            }

            let coverage = alpha / taps;
            let composite = |channel: usize, bg: u8| -> u8 {
                let value = f64::from(bg) * (1.0 - coverage) + sum[channel] / taps;
                value.round().clamp(0.0, 255.0) as u8
            };

            buffer.push([
                composite(0, background.r),
                composite(1, background.g),
                composite(2, background.b),
                (coverage * 255.0).round().clamp(0.0, 255.0) as u8,
            ]);
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::image_pipeline::geometry::compute_placement;

    #[test]
    fn opaque_image_fills_its_rectangle() {
        let source = RgbaImage::from_pixel(10, 10, Rgba([200, 100, 50, 255]));
        let placement = compute_placement(10, 10, 10, 10, 1.0, 1.0, 0.0, 0.0, 0.0).unwrap();
        let buffer =
            rasterize(&source, &placement, &ToneFilter::default(), Rgb::BLACK, 10, 10, 2);

        assert_eq!(buffer.len(), 100);
        assert!(buffer.iter().all(|px| *px == [200, 100, 50, 255]));
    }

    #[test]
    fn uncovered_pixels_show_background_with_zero_coverage() {
        let source = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        // Half scale leaves a border around the image.
        let placement = compute_placement(10, 10, 10, 10, 1.0, 0.5, 0.0, 0.0, 0.0).unwrap();
        let bg = Rgb::new(10, 20, 30);
        let buffer = rasterize(&source, &placement, &ToneFilter::default(), bg, 10, 10, 2);

        assert_eq!(buffer[0], [10, 20, 30, 0]);
        assert_eq!(buffer[5 * 10 + 5], [255, 255, 255, 255]);
    }

    #[test]
    fn transparent_source_pixels_do_not_count_as_coverage() {
        let source = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 0]));
        let placement = compute_placement(4, 4, 4, 4, 1.0, 1.0, 0.0, 0.0, 0.0).unwrap();
        let buffer = rasterize(&source, &placement, &ToneFilter::default(), Rgb::BLACK, 4, 4, 1);
        assert!(buffer.iter().all(|px| *px == [0, 0, 0, 0]));
    }

    #[test]
    fn filter_is_applied_to_source_not_background() {
        let source = RgbaImage::from_pixel(4, 4, Rgba([200, 200, 200, 255]));
        let placement = compute_placement(4, 4, 4, 4, 1.0, 0.5, 0.0, 0.0, 0.0).unwrap();
        let filter = ToneFilter::new(1.0, 0.5);
        let bg = Rgb::new(80, 80, 80);
        let buffer = rasterize(&source, &placement, &filter, bg, 4, 4, 2);

        assert_eq!(buffer[0], [80, 80, 80, 0]);
        assert_eq!(buffer[4 + 1], [100, 100, 100, 255]);
    }
}
