// ============================================================================
// SHAPE GEOMETRY — inside tests and nearest-boundary classification
// ============================================================================

use crate::ops::InvalidGeometry;

/// Shape whose interior receives the displacement field.
///
/// A closed set of variants: the rasterizer runs one pixel loop and
/// dispatches the boundary math per shape through [`ShapeGeometry::classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    /// Disc centered in the output image.
    Circle { radius: f32 },
    /// Axis-aligned rounded rectangle anchored at the image origin, built
    /// from a central band and two circular caps. A pill/stadium shape when
    /// `corner_radius == height / 2`.
    RoundedRect {
        width: f32,
        height: f32,
        corner_radius: f32,
    },
}

/// The nearest piece of shape boundary as seen from one interior pixel.
#[derive(Debug, Clone, Copy)]
pub struct BoundarySample {
    /// Distance inward from the nearest boundary, in pixels.
    pub distance: f32,
    /// Local interior radius at that boundary point — the denominator used
    /// to normalize `distance` into the profile's 0..1 axis.
    pub interior_radius: f32,
    /// Unit normal pointing into the shape at the nearest boundary point.
    pub inward_normal: (f32, f32),
}

impl ShapeGeometry {
    /// Validated circle.
    pub fn circle(radius: f32) -> Result<Self, InvalidGeometry> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(InvalidGeometry::Radius(radius));
        }
        Ok(ShapeGeometry::Circle { radius })
    }

    /// Validated rounded rectangle. The corner radius must be positive
    /// (it becomes a normalization denominator) and at most half the
    /// smaller side; violations are refused, not clamped.
    pub fn rounded_rect(width: f32, height: f32, corner_radius: f32) -> Result<Self, InvalidGeometry> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(InvalidGeometry::Dimensions(width, height));
        }
        let limit = width.min(height) / 2.0;
        if !corner_radius.is_finite() || corner_radius <= 0.0 || corner_radius > limit {
            return Err(InvalidGeometry::CornerRadius {
                corner_radius,
                limit,
            });
        }
        Ok(ShapeGeometry::RoundedRect {
            width,
            height,
            corner_radius,
        })
    }

    /// Classify a pixel against the shape within an `image_w` × `image_h`
    /// output. `None` for pixels outside the shape; otherwise the
    /// nearest-boundary sample the rasterizer projects the profile with.
    pub fn classify(&self, x: f32, y: f32, image_w: f32, image_h: f32) -> Option<BoundarySample> {
        match *self {
            ShapeGeometry::Circle { radius } => {
                classify_circle(x, y, image_w / 2.0, image_h / 2.0, radius)
            }
            ShapeGeometry::RoundedRect {
                width,
                height,
                corner_radius,
            } => classify_rounded_rect(x, y, width, height, corner_radius),
        }
    }
}

fn classify_circle(x: f32, y: f32, cx: f32, cy: f32, radius: f32) -> Option<BoundarySample> {
    let dx = x - cx;
    let dy = y - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > radius {
        return None;
    }

    let angle = dy.atan2(dx);
    Some(BoundarySample {
        distance: radius - dist,
        interior_radius: radius,
        inward_normal: (-angle.cos(), -angle.sin()),
    })
}

fn classify_rounded_rect(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    corner_radius: f32,
) -> Option<BoundarySample> {
    let r = corner_radius;
    let (left_cx, left_cy) = (r, height / 2.0);
    let (right_cx, right_cy) = (width - r, height / 2.0);

    let d_left = ((x - left_cx) * (x - left_cx) + (y - left_cy) * (y - left_cy)).sqrt();
    let d_right = ((x - right_cx) * (x - right_cx) + (y - right_cy) * (y - right_cy)).sqrt();

    let in_band = x >= r && x <= width - r && y >= 0.0 && y <= height;
    if !in_band && d_left > r && d_right > r {
        return None;
    }

    // Inward normal toward a cap center; a pixel sitting exactly on the
    // center gets a finite, arbitrary direction (denominator 1).
    let toward = |cx: f32, cy: f32, d: f32| {
        let denom = if d > 0.0 { d } else { 1.0 };
        ((cx - x) / denom, (cy - y) / denom)
    };

    // Candidate boundaries in fixed order; the first strict minimum wins.
    // Ties sit on a measure-zero set of pixels, so the order is free.
    let candidates = [
        (y, height / 2.0, (0.0, 1.0)),
        (height - 1.0 - y, height / 2.0, (0.0, -1.0)),
        ((r - d_left).abs(), r, toward(left_cx, left_cy, d_left)),
        ((r - d_right).abs(), r, toward(right_cx, right_cy, d_right)),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }

    Some(BoundarySample {
        distance: best.0,
        interior_radius: best.1,
        inward_normal: best.2,
    })
}
