// ============================================================================
// OPTICAL PROFILE — 1-D single-surface refraction model along the bezel
// ============================================================================

use crate::ops::InvalidGeometry;

/// Refractive index of the incident medium (air).
const REFRACTIVE_INDEX_AIR: f32 = 1.0;
/// Refractive index of the glass body.
const REFRACTIVE_INDEX_GLASS: f32 = 1.5;
/// Step for the central-difference slope of the surface curve.
const SLOPE_STEP: f32 = 0.001;

/// Height of the glass surface across the bezel: a convex squircle rising
/// from 0 at the outer edge (`u = 0`) to 1 where the flat interior starts
/// (`u = 1`).
#[inline]
pub fn surface_height(u: f32) -> f32 {
    (1.0 - (1.0 - u).powi(4)).powf(0.25)
}

/// Slope of the surface curve at `u`. Central difference with both
/// evaluation points clamped into [0, 1] — the quartic root is undefined
/// left of 0, so an unclamped stencil would go NaN at the edge.
#[inline]
fn surface_slope(u: f32) -> f32 {
    let lo = (u - SLOPE_STEP).max(0.0);
    let hi = (u + SLOPE_STEP).min(1.0);
    (surface_height(hi) - surface_height(lo)) / (hi - lo)
}

/// Snell's law: angle of the refracted ray entering a medium of index `n2`
/// from a medium of index `n1`.
#[inline]
fn snells_law(incident_angle: f32, n1: f32, n2: f32) -> f32 {
    (((n1 / n2) * incident_angle.sin()).clamp(-1.0, 1.0)).asin()
}

/// Displacement magnitude at position `u` within the bezel for a glass body
/// of the given thickness.
///
/// Single surface, single bounce: a vertical ray meets the curved surface,
/// bends once per Snell's law, and the lateral offset accumulated through
/// the local glass height is the displacement.
fn displacement_at(u: f32, glass_thickness: f32) -> f32 {
    let height = surface_height(u);

    // Surface normal: tangent rotated -90°, normalized
    let slope = surface_slope(u);
    let len = (slope * slope + 1.0).sqrt();
    let normal = (-slope / len, 1.0 / len);

    // Incident ray travels straight down
    let incident = (0.0f32, -1.0f32);
    let dot = incident.0 * normal.0 + incident.1 * normal.1;
    let incident_angle = (-dot).clamp(-1.0, 1.0).acos();

    let refracted_angle = snells_law(incident_angle, REFRACTIVE_INDEX_AIR, REFRACTIVE_INDEX_GLASS);

    let actual_thickness = height * glass_thickness;
    (actual_thickness * (refracted_angle - incident_angle).tan()).abs()
}

/// 1-D lookup table of displacement magnitudes along one radius.
///
/// Index 0 sits on the shape's outer edge, the last index at the shape
/// center. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalProfile {
    magnitudes: Vec<f32>,
    max_magnitude: f32,
}

impl OpticalProfile {
    /// Sample the refraction model at `samples` evenly spaced points.
    ///
    /// Positions past `bezel_fraction` lie on the flat interior and
    /// displace nothing. `bezel_fraction == 0` is legal and produces an
    /// all-zero (non-refracting) profile regardless of thickness.
    pub fn generate(
        samples: usize,
        bezel_fraction: f32,
        glass_thickness: f32,
    ) -> Result<Self, InvalidGeometry> {
        if samples < 2 {
            return Err(InvalidGeometry::SampleCount(samples));
        }
        if !bezel_fraction.is_finite() || !(0.0..=1.0).contains(&bezel_fraction) {
            return Err(InvalidGeometry::BezelFraction(bezel_fraction));
        }
        if !glass_thickness.is_finite() || glass_thickness < 0.0 {
            return Err(InvalidGeometry::Thickness(glass_thickness));
        }

        let mut magnitudes = Vec::with_capacity(samples);
        for i in 0..samples {
            let t = i as f32 / (samples - 1) as f32;
            let magnitude = if bezel_fraction > 0.0 && t <= bezel_fraction {
                // Remap into the bevel's own 0..1 axis
                displacement_at(t / bezel_fraction, glass_thickness)
            } else {
                0.0
            };
            magnitudes.push(magnitude);
        }

        let max_magnitude = magnitudes.iter().fold(0.0f32, |acc, &m| acc.max(m));

        Ok(Self {
            magnitudes,
            max_magnitude,
        })
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Largest magnitude in the table (0 for a flat profile).
    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Magnitude at a normalized boundary distance (0 = edge, 1 = center).
    /// Out-of-range inputs are clamped; the index never leaves the table.
    pub fn sample(&self, normalized_distance: f32) -> f32 {
        let last = self.magnitudes.len() - 1;
        let idx = (normalized_distance.clamp(0.0, 1.0) * last as f32).floor() as usize;
        self.magnitudes[idx.min(last)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_bezel_is_flat() {
        let profile = OpticalProfile::generate(127, 0.0, 500.0).unwrap();
        assert!(profile.magnitudes().iter().all(|&m| m == 0.0));
        assert_eq!(profile.max_magnitude(), 0.0);
    }

    #[test]
    fn magnitudes_nonnegative_and_max_matches() {
        let profile = OpticalProfile::generate(127, 0.3, 100.0).unwrap();
        let mut true_max = 0.0f32;
        for &m in profile.magnitudes() {
            assert!(m >= 0.0);
            true_max = true_max.max(m);
        }
        assert!((profile.max_magnitude() - true_max).abs() < 1e-9);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = OpticalProfile::generate(127, 0.3, 100.0).unwrap();
        let b = OpticalProfile::generate(127, 0.3, 100.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_nan_at_bevel_endpoints() {
        // u = 0 exercises the clamped left stencil point, bezel = 1 puts
        // u = 1 (clamped right stencil point) on the last sample
        let profile = OpticalProfile::generate(127, 1.0, 1000.0).unwrap();
        assert!(profile.magnitudes().iter().all(|m| m.is_finite()));
        // Edge sample has zero surface height, so zero displacement
        assert_eq!(profile.magnitudes()[0], 0.0);
    }

    #[test]
    fn surface_curve_endpoints() {
        assert!(surface_height(0.0).abs() < 1e-6);
        assert!((surface_height(1.0) - 1.0).abs() < 1e-6);
        // Convex: halfway up the bezel the surface is already well above 1/2
        assert!(surface_height(0.5) > 0.9);
    }

    #[test]
    fn interior_samples_are_flat() {
        let profile = OpticalProfile::generate(127, 0.3, 100.0).unwrap();
        let len = profile.len();
        for (i, &m) in profile.magnitudes().iter().enumerate() {
            let t = i as f32 / (len - 1) as f32;
            if t > 0.3 {
                assert_eq!(m, 0.0, "sample {} is past the bezel", i);
            }
        }
        // The bevel itself does refract
        assert!(profile.max_magnitude() > 0.0);
    }

    #[test]
    fn rejects_degenerate_sample_counts() {
        assert!(OpticalProfile::generate(0, 0.3, 100.0).is_err());
        assert!(OpticalProfile::generate(1, 0.3, 100.0).is_err());
        assert!(OpticalProfile::generate(2, 0.3, 100.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        assert!(OpticalProfile::generate(127, -0.1, 100.0).is_err());
        assert!(OpticalProfile::generate(127, 1.1, 100.0).is_err());
        assert!(OpticalProfile::generate(127, f32::NAN, 100.0).is_err());
        assert!(OpticalProfile::generate(127, 0.3, -1.0).is_err());
        assert!(OpticalProfile::generate(127, 0.3, f32::INFINITY).is_err());
    }

    #[test]
    fn sample_lookup_stays_in_bounds() {
        let profile = OpticalProfile::generate(127, 0.3, 100.0).unwrap();
        // Endpoints and near-endpoint values must all resolve to a slot
        assert_eq!(profile.sample(0.0), profile.magnitudes()[0]);
        assert_eq!(profile.sample(1.0), profile.magnitudes()[126]);
        let _ = profile.sample(0.999_999);
        let _ = profile.sample(-0.5);
        let _ = profile.sample(2.0);
    }

    proptest! {
        #[test]
        fn profile_always_finite_and_nonnegative(
            samples in 2usize..300,
            bezel in 0.0f32..=1.0,
            thickness in 0.0f32..1000.0,
        ) {
            let profile = OpticalProfile::generate(samples, bezel, thickness).unwrap();
            prop_assert_eq!(profile.len(), samples);
            for &m in profile.magnitudes() {
                prop_assert!(m.is_finite());
                prop_assert!(m >= 0.0);
            }
            prop_assert!(profile.max_magnitude().is_finite());
        }

        #[test]
        fn sample_never_panics(nd in -2.0f32..3.0) {
            let profile = OpticalProfile::generate(64, 0.4, 200.0).unwrap();
            let m = profile.sample(nd);
            prop_assert!(m.is_finite());
        }
    }
}
