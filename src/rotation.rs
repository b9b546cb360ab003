//! Frame rotations between a local spherical source frame and the earth frame
//!
//! The source frame at (lon, colat) has its x axis along theta (south), y
//! along phi (east) and z along r (up). The earth frame is the global
//! Cartesian frame with z through the north pole and x through lon = 0.
//! Tensors are handled in Voigt order `[xx, yy, zz, yz, xz, xy]`, which in
//! the source frame is `[tt, pp, rr, rp, rt, tp]`.

use nalgebra::{Matrix3, Vector3};

use crate::tensor::VoigtTensor;

/// Columns are the theta, phi and r unit vectors expressed in the earth frame
fn src_to_earth_matrix(phi: f64, theta: f64) -> Matrix3<f64> {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Matrix3::new(
        cos_theta * cos_phi,
        -sin_phi,
        sin_theta * cos_phi,
        cos_theta * sin_phi,
        cos_phi,
        sin_theta * sin_phi,
        -sin_theta,
        0.0,
        cos_theta,
    )
}

fn voigt_to_matrix(voigt: &VoigtTensor) -> Matrix3<f64> {
    let [xx, yy, zz, yz, xz, xy] = voigt.0;
    Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
}

fn matrix_to_voigt(m: &Matrix3<f64>) -> VoigtTensor {
    VoigtTensor([
        m[(0, 0)],
        m[(1, 1)],
        m[(2, 2)],
        m[(1, 2)],
        m[(0, 2)],
        m[(0, 1)],
    ])
}

/// Rotate a symmetric tensor from the source frame at (`phi` = longitude,
/// `theta` = colatitude, both in radians) into the earth frame.
pub fn rotate_symm_tensor_voigt_src_to_earth(
    tensor: &VoigtTensor,
    phi: f64,
    theta: f64,
) -> VoigtTensor {
    let rot = src_to_earth_matrix(phi, theta);
    matrix_to_voigt(&(rot * voigt_to_matrix(tensor) * rot.transpose()))
}

/// Inverse of [`rotate_symm_tensor_voigt_src_to_earth`]
pub fn rotate_symm_tensor_voigt_earth_to_src(
    tensor: &VoigtTensor,
    phi: f64,
    theta: f64,
) -> VoigtTensor {
    let rot = src_to_earth_matrix(phi, theta);
    matrix_to_voigt(&(rot.transpose() * voigt_to_matrix(tensor) * rot))
}

/// Rotate a vector given as (theta, phi, r) components into the earth frame
pub fn rotate_vector_src_to_earth(vector: &[f64; 3], phi: f64, theta: f64) -> [f64; 3] {
    let v = src_to_earth_matrix(phi, theta) * Vector3::from(*vector);
    [v.x, v.y, v.z]
}

/// Rotate an earth-frame vector into (theta, phi, r) components at (phi, theta)
pub fn rotate_vector_earth_to_src(vector: &[f64; 3], phi: f64, theta: f64) -> [f64; 3] {
    let v = src_to_earth_matrix(phi, theta).transpose() * Vector3::from(*vector);
    [v.x, v.y, v.z]
}
