//! Exponential-map rotation used by the reprojection factor.

use nalgebra::{RealField, Vector3};

// Threshold on the squared angle below which the rotation switches to its
// first-order expansion. Keeps dual-number derivatives finite at the
// identity rotation, where poses are commonly initialized.
const SMALL_ANGLE_SQ: f64 = 1.0e-12;

/// Rotate `p` by the rotation vector `aa` (angle-axis exponential map).
///
/// Generic over `T` so the solver can evaluate it on dual numbers. Uses the
/// Rodrigues formula away from zero and the series `p + aa x p` near it.
pub fn rotate_angle_axis<T: RealField>(aa: &Vector3<T>, p: &Vector3<T>) -> Vector3<T> {
    let theta2 = aa.norm_squared();
    if theta2 > T::from_f64(SMALL_ANGLE_SQ).unwrap() {
        let theta = theta2.sqrt();
        let (sin_t, cos_t) = theta.clone().sin_cos();
        let theta_inv = T::one() / theta;
        let w = aa * theta_inv;
        let w_cross_p = w.cross(p);
        let w_dot_p = w.dot(p);
        p * cos_t.clone() + w_cross_p * sin_t + w * (w_dot_p * (T::one() - cos_t))
    } else {
        p + aa.cross(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    fn assert_close(a: &Vector3<f64>, b: &Vector3<f64>, tol: f64) {
        assert!(
            (a - b).norm() < tol,
            "vectors differ: {:?} vs {:?} (tol={})",
            a,
            b,
            tol
        );
    }

    #[test]
    fn zero_rotation_is_identity() {
        let p = Vector3::new(1.0, -2.0, 3.0);
        let r = rotate_angle_axis(&Vector3::zeros(), &p);
        assert_close(&r, &p, 1e-15);
    }

    #[test]
    fn matches_nalgebra_exponential_map() {
        let cases = [
            Vector3::new(0.3, -0.2, 0.5),
            Vector3::new(1.5, 0.0, 0.0),
            Vector3::new(-0.7, 1.1, -2.0),
            Vector3::new(0.0, 3.0, 0.0),
        ];
        let p = Vector3::new(0.4, -1.3, 2.2);
        for aa in cases {
            let expected = Rotation3::from_scaled_axis(aa) * p;
            let got = rotate_angle_axis(&aa, &p);
            assert_close(&got, &expected, 1e-12);
        }
    }

    #[test]
    fn small_angle_branch_is_continuous() {
        let aa = Vector3::new(1e-7, -2e-7, 5e-8);
        let p = Vector3::new(1.0, 2.0, 3.0);
        let expected = Rotation3::from_scaled_axis(aa) * p;
        let got = rotate_angle_axis(&aa, &p);
        assert_close(&got, &expected, 1e-12);
    }
}
