//! Fault geometry and the linear shear-traction operator.
//!
//! Frame: north–east–down (Aki & Richards). For a plane with strike `φ`
//! (dip direction − 90°), dip `δ` and rake `λ`:
//!
//! - normal `n = (−sinδ sinφ, sinδ cosφ, −cosδ)`
//! - slip   `s = (cosλ cosφ + sinλ cosδ sinφ, cosλ sinφ − sinλ cosδ cosφ, −sinλ sinδ)`
//!
//! The stress tensor is deviatoric with five free components
//! `m = [σ11, σ12, σ13, σ22, σ23]` and `σ33 = −(σ11 + σ22)`. The shear traction
//! `τ = σn − (n·σn) n` is linear in `m`, so each plane contributes a 3×5 block.

use nalgebra::{Matrix3, Vector3};

/// Free stress components per grid cell.
pub const N_COMPONENTS: usize = 5;

/// Unit normal and unit slip vector of one fault plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipGeometry {
    pub normal: Vector3<f64>,
    pub slip: Vector3<f64>,
}

/// Build the plane normal and slip direction from dip direction, dip and rake (degrees).
pub fn slip_geometry(dip_direction: f64, dip_angle: f64, rake: f64) -> SlipGeometry {
    let strike = (dip_direction - 90.0).to_radians();
    let dip = dip_angle.to_radians();
    let rake = rake.to_radians();

    let (s_phi, c_phi) = strike.sin_cos();
    let (s_del, c_del) = dip.sin_cos();
    let (s_lam, c_lam) = rake.sin_cos();

    SlipGeometry {
        normal: Vector3::new(-s_del * s_phi, s_del * c_phi, -c_del),
        slip: Vector3::new(
            c_lam * c_phi + s_lam * c_del * s_phi,
            c_lam * s_phi - s_lam * c_del * c_phi,
            -s_lam * s_del,
        ),
    }
}

/// Rake (degrees) of an arbitrary in-plane direction.
///
/// The direction does not need to be unit length; any component along the
/// normal is ignored.
pub fn rake_from_direction(dip_direction: f64, dip_angle: f64, direction: &Vector3<f64>) -> f64 {
    let strike = (dip_direction - 90.0).to_radians();
    let dip = dip_angle.to_radians();
    let (s_phi, c_phi) = strike.sin_cos();
    let (s_del, c_del) = dip.sin_cos();

    let along_strike = Vector3::new(c_phi, s_phi, 0.0);
    let up_dip = Vector3::new(c_del * s_phi, -c_del * c_phi, -s_del);
    direction.dot(&up_dip).atan2(direction.dot(&along_strike)).to_degrees()
}

/// Deviatoric tensor from the five free components.
pub fn deviatoric_tensor(m: &[f64; N_COMPONENTS]) -> Matrix3<f64> {
    let [s11, s12, s13, s22, s23] = *m;
    Matrix3::new(
        s11, s12, s13, //
        s12, s22, s23, //
        s13, s23, -(s11 + s22),
    )
}

/// Shear traction of `sigma` on the plane with unit normal `n`.
pub fn shear_traction(sigma: &Matrix3<f64>, n: &Vector3<f64>) -> Vector3<f64> {
    let t = sigma * n;
    t - n * t.dot(n)
}

/// Coefficients `G` (3×5, row-major) such that `τ = G m` for unit normal `n`.
pub fn shear_traction_rows(n: &Vector3<f64>) -> [[f64; N_COMPONENTS]; 3] {
    let mut rows = [[0.0; N_COMPONENTS]; 3];
    for k in 0..N_COMPONENTS {
        let mut unit = [0.0; N_COMPONENTS];
        unit[k] = 1.0;
        let tau = shear_traction(&deviatoric_tensor(&unit), n);
        for (i, row) in rows.iter_mut().enumerate() {
            row[k] = tau[i];
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_and_slip_are_orthonormal() {
        for &(ddir, dip, rake) in &[(0.0, 30.0, 90.0), (135.0, 60.0, -45.0), (300.0, 89.0, 170.0), (45.0, 0.0, 0.0)] {
            let g = slip_geometry(ddir, dip, rake);
            assert!((g.normal.norm() - 1.0).abs() < 1e-12);
            assert!((g.slip.norm() - 1.0).abs() < 1e-12);
            assert!(g.normal.dot(&g.slip).abs() < 1e-12);
        }
    }

    #[test]
    fn normal_points_up_and_toward_hanging_wall_for_east_dipping_plane() {
        // Dip direction 90 (east), dip 45: the upward normal tilts to the east.
        let g = slip_geometry(90.0, 45.0, 0.0);
        assert!(g.normal[1] > 0.0);
        assert!(g.normal[2] < 0.0);
        assert!(g.normal[0].abs() < 1e-12);
    }

    #[test]
    fn rake_round_trips_through_slip_vector() {
        let (ddir, dip) = (210.0, 55.0);
        for &rake in &[-170.0, -90.0, -10.0, 0.0, 33.0, 90.0, 179.0] {
            let g = slip_geometry(ddir, dip, rake);
            let back = rake_from_direction(ddir, dip, &(g.slip * 2.5));
            assert!((back - rake).abs() < 1e-9, "rake {rake} came back as {back}");
        }
    }

    #[test]
    fn linear_rows_match_direct_shear_traction() {
        let m = [0.3, -0.2, 0.1, -0.5, 0.25];
        let g = slip_geometry(75.0, 40.0, 20.0);
        let rows = shear_traction_rows(&g.normal);
        let direct = shear_traction(&deviatoric_tensor(&m), &g.normal);
        for i in 0..3 {
            let lin: f64 = rows[i].iter().zip(m.iter()).map(|(a, b)| a * b).sum();
            assert!((lin - direct[i]).abs() < 1e-12);
        }
        // Shear traction lies in the plane.
        assert!(direct.dot(&g.normal).abs() < 1e-12);
    }
}
