//! Frame-to-frame pseudo-distance between spectrogram columns.
//!
//! `cos_log` is deliberately non-metric: it is loudness-robust (quiet and
//! loud frames with the same spectral shape score as similar) but does not
//! satisfy the triangle inequality, so none of the classical shortest-path
//! pruning tricks that rely on it are valid here.

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine *distance* (not similarity, despite the name carried over from the
/// original) of two equal-length frequency-bin vectors: `1 -
/// cos_angle(a, b)` when both are nonzero, in `[0, 2]`; `1` if exactly one
/// vector is all-zero (maximally uninformative, not maximally distant);
/// `0` if both are all-zero (two silent frames agree trivially).
pub fn cos_sim(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 && nb == 0.0 {
        return 0.0;
    }
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (1.0 - (dot / (na * nb)).clamp(-1.0, 1.0)).max(0.0)
}

/// `cos_sim(a, b) * (log(1 + ||a||) + log(1 + ||b||))`: weights the angular
/// mismatch by logarithmic loudness, so that proportionally loud/quiet
/// frames with identical spectral shape score as identical (the loudness
/// factor is then multiplied by zero), a zero-vs-nonzero frame still scores
/// finite and grows with the nonzero frame's loudness, and a single
/// transient loud frame contributes sublinearly. Always >= 0.
pub fn cos_log(a: &[f64], b: &[f64]) -> f64 {
    let sim = cos_sim(a, b);
    sim * (norm(a).ln_1p() + norm(b).ln_1p())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let a = [1.0, 2.0, 3.0, 0.5];
        assert!(cos_sim(&a, &a).abs() < 1e-9);
        assert!(cos_log(&a, &a).abs() < 1e-9);
    }

    #[test]
    fn loudness_invariant() {
        // Same direction, different magnitude: angular distance is zero, so
        // the loudness factor is multiplied by zero regardless of how loud
        // either frame is.
        let a = [1.0, 2.0, 3.0];
        let loud = [10.0, 20.0, 30.0];
        assert!(cos_sim(&a, &loud).abs() < 1e-9);
        assert!(cos_log(&a, &loud).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_are_maximally_distant() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!((cos_sim(&a, &b) - 1.0).abs() < 1e-9);
        let expected = 2.0f64.ln_1p(); // norm(a) = norm(b) = 1
        assert!((cos_log(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_vs_nonzero_is_finite_and_grows_with_norm() {
        let zero = [0.0, 0.0, 0.0];
        let small = [1.0, 2.0, 3.0];
        let big = [10.0, 20.0, 30.0];

        assert_eq!(cos_sim(&zero, &small), 1.0);
        let d_small = cos_log(&zero, &small);
        let d_big = cos_log(&zero, &big);
        assert!(d_small.is_finite() && d_small > 0.0);
        assert!(d_big > d_small, "distance to a louder zero-mismatched frame should grow");
    }

    #[test]
    fn both_zero_frames_agree() {
        let zero = [0.0, 0.0, 0.0];
        assert_eq!(cos_sim(&zero, &zero), 0.0);
        assert_eq!(cos_log(&zero, &zero), 0.0);
    }

    #[test]
    fn distance_is_never_negative_even_when_opposite() {
        let a = [1.0, -2.0, 3.0];
        let b = [-1.0, 2.0, -3.0]; // exactly opposite direction: cos_angle = -1
        assert!((cos_sim(&a, &b) - 2.0).abs() < 1e-9);
        assert!(cos_log(&a, &b) >= 0.0);
    }

    #[test]
    fn symmetric_in_its_two_arguments() {
        let a = [1.0, 0.5, -2.0];
        let b = [3.0, -1.0, 0.2];
        assert!((cos_log(&a, &b) - cos_log(&b, &a)).abs() < 1e-12);
    }
}
