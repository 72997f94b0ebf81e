// ============================================================================
// DISPLACEMENT RASTERIZER — project the 1-D profile across a 2-D shape
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::ops::geometry::ShapeGeometry;
use crate::ops::profile::OpticalProfile;
use crate::ops::InvalidGeometry;

/// Channel value meaning "no displacement".
const NEUTRAL: u8 = 128;
/// Rim width in pixels for the anti-aliased edge of the profile-max strategy.
const EDGE_BLEND_WIDTH: f32 = 2.0;

/// Fixed-strategy divisor that keeps visual intensity independent of the
/// bezel/thickness combination. Empirical tuning constant.
pub const DEFAULT_NORMALIZATION_FACTOR: f32 = 50.0;

/// How raw displacement magnitudes map into the [-1, 1] channel range.
///
/// Both strategies are supported on purpose; outputs produced with one are
/// not interchangeable with the other, so record which one was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Divide by a fixed tuning constant. Hard cutoff at the shape edge,
    /// displacement along the inward boundary normal for every shape —
    /// the convention under which a width == height pill reproduces the
    /// circle output.
    Fixed(f32),
    /// Divide by the profile's own maximum (flat profile displaces
    /// nothing), soften the outermost two pixels, and keep the original
    /// outward direction convention.
    ProfileMax,
}

/// Encode one displacement component into a channel byte, 128 = zero.
#[inline]
fn encode_channel(component: f32) -> u8 {
    (128.0 + component * 127.0).round().clamp(0.0, 255.0) as u8
}

/// Rasterize a displacement field for `geometry` into a fresh
/// `out_width` × `out_height` RGBA buffer.
///
/// R/G carry the x/y displacement, B is fixed at 128 and A at 255. Pixels
/// outside the shape are fully neutral. Rows are independent, so they are
/// filled in parallel.
pub fn rasterize(
    profile: &OpticalProfile,
    geometry: ShapeGeometry,
    out_width: u32,
    out_height: u32,
    normalization: Normalization,
) -> Result<RgbaImage, InvalidGeometry> {
    if out_width == 0 || out_height == 0 {
        return Err(InvalidGeometry::OutputSize(out_width, out_height));
    }
    if let Normalization::Fixed(factor) = normalization {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(InvalidGeometry::NormalizationFactor(factor));
        }
    }

    let w = out_width as usize;
    let h = out_height as usize;
    let stride = w * 4;
    let (img_w, img_h) = (out_width as f32, out_height as f32);

    let mut raw = vec![0u8; w * h * 4];
    raw.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..w {
                let pi = x * 4;
                let (r, g) =
                    displace_pixel(profile, geometry, x as f32, y as f32, img_w, img_h, normalization);
                row_out[pi] = r;
                row_out[pi + 1] = g;
                row_out[pi + 2] = NEUTRAL;
                row_out[pi + 3] = 255;
            }
        });

    // Buffer length matches the dimensions by construction
    Ok(RgbaImage::from_raw(out_width, out_height, raw).unwrap())
}

/// R/G bytes for a single pixel.
fn displace_pixel(
    profile: &OpticalProfile,
    geometry: ShapeGeometry,
    x: f32,
    y: f32,
    img_w: f32,
    img_h: f32,
    normalization: Normalization,
) -> (u8, u8) {
    let Some(boundary) = geometry.classify(x, y, img_w, img_h) else {
        return (NEUTRAL, NEUTRAL);
    };

    let nd = (boundary.distance / boundary.interior_radius).clamp(0.0, 1.0);
    let magnitude = profile.sample(nd);
    let (nx, ny) = boundary.inward_normal;

    match normalization {
        Normalization::Fixed(factor) => {
            let m = magnitude / factor;
            (encode_channel(nx * m), encode_channel(ny * m))
        }
        Normalization::ProfileMax => {
            let max = profile.max_magnitude();
            let m = if max > 0.0 { magnitude / max } else { 0.0 };
            // Smooth falloff over the outermost pixels instead of a hard rim
            let alpha = (boundary.distance / EDGE_BLEND_WIDTH).clamp(0.0, 1.0);
            // Outward direction convention for this strategy
            (
                encode_channel(-nx * m * alpha),
                encode_channel(-ny * m * alpha),
            )
        }
    }
}
