//! Raster sampling with nearest, bilinear and Lanczos3 interpolation.
//!
//! Samples are taken in the raster's own pixel space, where pixel (i, j)
//! has its centre at `(i + 0.5, j + 0.5)`. Points outside the raster yield
//! `None`; points inside but near an edge clamp their neighbourhood to the
//! edge, so an item never grows a dark fringe.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::raster::{Raster, Rgba};

/// Interpolation filter used when rendering transformed rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Nearest neighbor - what an unhinted painter draws.
    Nearest,
    /// Fast bilinear interpolation - good for preview rendering.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation - good for export.
    Lanczos3,
}

/// Sample `raster` at a point in its pixel space.
pub fn sample(raster: &Raster, p: Point, filter: InterpolationFilter) -> Option<Rgba> {
    if raster.is_empty()
        || !(p.x >= 0.0 && p.y >= 0.0)
        || p.x >= raster.width as f64
        || p.y >= raster.height as f64
    {
        return None;
    }

    // Shift so integer coordinates land on pixel centres
    let x = p.x - 0.5;
    let y = p.y - 0.5;

    Some(match filter {
        InterpolationFilter::Nearest => raster.pixel(p.x as u32, p.y as u32),
        InterpolationFilter::Bilinear => sample_bilinear(raster, x, y),
        InterpolationFilter::Lanczos3 => sample_lanczos3(raster, x, y),
    })
}

/// Get a pixel as [f64; 4] with coordinates clamped to the raster.
#[inline]
fn get_pixel_f64(raster: &Raster, px: i64, py: i64) -> [f64; 4] {
    let px = px.clamp(0, raster.width as i64 - 1) as u32;
    let py = py.clamp(0, raster.height as i64 - 1) as u32;
    raster.pixel(px, py).map(f64::from)
}

/// Bilinear interpolation over the 4 nearest pixels.
fn sample_bilinear(raster: &Raster, x: f64, y: f64) -> Rgba {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(raster, x0, y0);
    let p10 = get_pixel_f64(raster, x0 + 1, y0);
    let p01 = get_pixel_f64(raster, x0, y0 + 1);
    let p11 = get_pixel_f64(raster, x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
fn sample_lanczos3(raster: &Raster, x: f64, y: f64) -> Rgba {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_pixel_f64(raster, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 4];
    if weight_sum.abs() > f64::EPSILON {
        for i in 0..4 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
