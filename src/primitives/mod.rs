//! Cubic falloff profile for point primitives
//!
//! The profile and its Lipschitz bounds work on squared distances, which
//! keeps square roots out of the field evaluation hot path.
//!
//! Author: Moroya Sakamoto

/// Compactly supported cubic falloff `(1 - x/r2)^3`
///
/// `x` is the squared distance to the center and `r2` the squared support
/// radius. Zero at and beyond the support boundary.
#[inline(always)]
pub fn falloff(x: f64, r2: f64) -> f64 {
    if x > r2 {
        0.0
    } else {
        let t = 1.0 - x / r2;
        t * t * t
    }
}

/// Global Lipschitz bound of the falloff scaled by energy `e`
///
/// The constant 1.72 upper-bounds the maximum slope of the profile,
/// `6 * sqrt(1/5) * (4/5)^2 ≈ 1.7175`, reached at squared distance `r²/5`.
#[inline(always)]
pub fn falloff_k(e: f64, r: f64) -> f64 {
    1.72 * e.abs() / r
}

/// Directional-derivative bound of the falloff over a squared-distance range
///
/// `amin` and `amax` are the nearest and farthest squared distances to the
/// center reached along the probed segment. The slope is monotone on either
/// side of the inflection at `r²/5`, so the extremum of the range gives the
/// bound; a range straddling the inflection falls back to the global bound.
#[inline]
pub fn falloff_segment_k(amin: f64, amax: f64, r: f64, e: f64) -> f64 {
    let r2 = r * r;
    if amin > r2 {
        return 0.0;
    }
    if amax < r2 / 5.0 {
        let t = 1.0 - amax / r2;
        e.abs() * 6.0 * (amax.sqrt() / r2) * (t * t)
    } else if amin > r2 / 5.0 {
        let t = 1.0 - amin / r2;
        e.abs() * 6.0 * (amin.sqrt() / r2) * (t * t)
    } else {
        falloff_k(e, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_center() {
        assert!((falloff(0.0, 4.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_falloff_midway() {
        // (1 - 1/4)^3 = 27/64
        assert!((falloff(1.0, 4.0) - 0.421875).abs() < 1e-12);
    }

    #[test]
    fn test_falloff_compact_support() {
        assert_eq!(falloff(4.0, 4.0), 0.0);
        assert_eq!(falloff(5.0, 4.0), 0.0);
        assert_eq!(falloff(100.0, 4.0), 0.0);
    }

    #[test]
    fn test_falloff_k_scales() {
        assert!((falloff_k(1.0, 2.0) - 0.86).abs() < 1e-12);
        assert!((falloff_k(-1.0, 2.0) - 0.86).abs() < 1e-12);
        assert!((falloff_k(2.0, 2.0) - 1.72).abs() < 1e-12);
    }

    #[test]
    fn test_segment_k_outside_support() {
        assert_eq!(falloff_segment_k(1.5, 2.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_segment_k_near_branch() {
        // Whole range below the inflection: bound from the far end
        let k = falloff_segment_k(0.05, 0.1, 1.0, 1.0);
        let expected = 6.0 * 0.1f64.sqrt() * (1.0 - 0.1) * (1.0 - 0.1);
        assert!((k - expected).abs() < 1e-12);
    }

    #[test]
    fn test_segment_k_far_branch() {
        // Whole range beyond the inflection: bound from the near end
        let k = falloff_segment_k(0.3, 0.9, 1.0, 1.0);
        let expected = 6.0 * 0.3f64.sqrt() * (1.0 - 0.3) * (1.0 - 0.3);
        assert!((k - expected).abs() < 1e-12);
    }

    #[test]
    fn test_segment_k_straddles_inflection() {
        // Range across r²/5 falls back to the global bound
        let k = falloff_segment_k(0.1, 0.5, 1.0, 1.0);
        assert!((k - 1.72).abs() < 1e-12);
    }

    #[test]
    fn test_segment_k_never_exceeds_global() {
        let samples = [
            (0.0, 0.1),
            (0.05, 0.19),
            (0.1, 0.5),
            (0.21, 0.9),
            (0.5, 1.5),
            (0.9, 0.99),
        ];
        for (amin, amax) in samples {
            let k = falloff_segment_k(amin, amax, 1.0, 1.0);
            assert!(
                k <= falloff_k(1.0, 1.0) + 1e-12,
                "segment bound {k} exceeds global for range ({amin}, {amax})"
            );
        }
    }
}
