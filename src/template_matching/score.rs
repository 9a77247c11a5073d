//! Correlation score surfaces
//!
//! One cell per template placement, `(H_cap - H_t + 1) x (W_cap - W_t + 1)` cells,
//! each holding a normalized cross-correlation coefficient in [-1, 1].

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::definitions::Image;
use imageproc::template_matching::{Extremes, find_extremes};
use serde::{Deserialize, Serialize};

/// Per-placement correlation scores
pub type ScoreSurface = Image<Luma<f32>>;

/// Per-pixel variance below which a patch counts as flat
const FLAT_VARIANCE: f64 = 1e-6;

/// Which pixel channels take part in scoring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Luma only
    Grayscale,
    /// Red, green and blue scored separately and averaged cell-wise
    Color,
}

/// Computes correlation surfaces between a capture and a template
#[derive(Clone, Copy, Debug)]
pub struct ScoreField {
    channels: ChannelMode,
}

impl ScoreField {
    pub fn new(channels: ChannelMode) -> Self {
        Self { channels }
    }

    /// Score every placement of `template` inside `capture`.
    ///
    /// Returns `None` when the template is empty or larger than the capture in
    /// either dimension.
    pub fn score(&self, capture: &DynamicImage, template: &DynamicImage) -> Option<ScoreSurface> {
        match self.channels {
            ChannelMode::Grayscale => score_plane(&capture.to_luma8(), &template.to_luma8()),
            ChannelMode::Color => score_color(&capture.to_rgb8(), &template.to_rgb8()),
        }
    }
}

/// Best cell of a surface as `(x, y, score)`; the first cell in row-major order wins ties
pub fn best_cell(surface: &ScoreSurface) -> (u32, u32, f32) {
    let Extremes {
        max_value,
        max_value_location,
        ..
    } = find_extremes(surface);
    (max_value_location.0, max_value_location.1, max_value)
}

fn score_color(capture: &RgbImage, template: &RgbImage) -> Option<ScoreSurface> {
    let mut fused: Option<ScoreSurface> = None;

    for channel in 0..3 {
        let surface = score_plane(
            &channel_plane(capture, channel),
            &channel_plane(template, channel),
        )?;
        match fused.as_mut() {
            None => fused = Some(surface),
            Some(acc) => {
                for (a, s) in acc.pixels_mut().zip(surface.pixels()) {
                    a[0] += s[0];
                }
            }
        }
    }

    let mut fused = fused?;
    for p in fused.pixels_mut() {
        p[0] /= 3.0;
    }
    Some(fused)
}

fn channel_plane(image: &RgbImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[channel]])
    })
}

/// Summed-area tables of pixel values and squared pixel values
struct WindowSums {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl WindowSums {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sum_sq = vec![0.0; stride * (h + 1)];
        let raw = image.as_raw();

        for y in 0..h {
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = raw[y * w + x] as f64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// Sum and squared sum of the `w`x`h` window at `(x, y)`
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let a = y * self.stride + x;
        let b = y * self.stride + x + w;
        let c = (y + h) * self.stride + x;
        let d = (y + h) * self.stride + x + w;
        (
            self.sum[d] - self.sum[b] - self.sum[c] + self.sum[a],
            self.sum_sq[d] - self.sum_sq[b] - self.sum_sq[c] + self.sum_sq[a],
        )
    }
}

/// Zero-mean normalized cross-correlation of one channel.
///
/// A flat template has no structure to correlate, so it is scored with plain
/// normalized cross-correlation instead. A structured template over a flat
/// window scores 0.
fn score_plane(image: &GrayImage, template: &GrayImage) -> Option<ScoreSurface> {
    let (iw, ih) = (image.width(), image.height());
    let (tw, th) = (template.width(), template.height());
    if tw == 0 || th == 0 || tw > iw || th > ih {
        log::debug!(
            "⚠️ Template {}x{} does not fit image {}x{}",
            tw,
            th,
            iw,
            ih
        );
        return None;
    }

    let n = (tw * th) as f64;
    let t_raw: Vec<f64> = template.as_raw().iter().map(|&v| v as f64).collect();
    let t_sum: f64 = t_raw.iter().sum();
    let t_sq_sum: f64 = t_raw.iter().map(|v| v * v).sum();
    let t_var_sum = (t_sq_sum - t_sum * t_sum / n).max(0.0);
    let template_flat = t_var_sum / n < FLAT_VARIANCE;

    let sums = WindowSums::new(image);
    let raw = image.as_raw();
    let (iw_us, tw_us, th_us) = (iw as usize, tw as usize, th as usize);

    let mut surface = ScoreSurface::new(iw - tw + 1, ih - th + 1);
    for (x, y, cell) in surface.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);

        let mut cross = 0.0;
        for ty in 0..th_us {
            let image_row = &raw[(y + ty) * iw_us + x..(y + ty) * iw_us + x + tw_us];
            let template_row = &t_raw[ty * tw_us..(ty + 1) * tw_us];
            cross += image_row
                .iter()
                .zip(template_row)
                .map(|(&i, &t)| i as f64 * t)
                .sum::<f64>();
        }

        let (w_sum, w_sq_sum) = sums.window(x, y, tw_us, th_us);
        let score = if template_flat {
            let denom = (t_sq_sum * w_sq_sum).sqrt();
            if denom > 0.0 { cross / denom } else { 0.0 }
        } else {
            let w_var_sum = (w_sq_sum - w_sum * w_sum / n).max(0.0);
            if w_var_sum / n < FLAT_VARIANCE {
                0.0
            } else {
                (cross - t_sum * w_sum / n) / (t_var_sum * w_var_sum).sqrt()
            }
        };

        cell[0] = score.clamp(-1.0, 1.0) as f32;
    }

    Some(surface)
}
