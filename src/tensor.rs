//! Moment tensors
//!
//! Components are stored in the spherical (r, theta, phi) basis in N·m.
//! Two fixed orderings are handed out: [`RtpTensor`] for consumers that
//! expect `[rr, tt, pp, rt, rp, tp]` and [`VoigtTensor`] for the rotation
//! routines, which expect `[tt, pp, rr, rp, rt, tp]`. They are distinct types
//! so one cannot be passed where the other is expected.

use serde::{Deserialize, Serialize};

/// Moment tensor components ordered `[rr, tt, pp, rt, rp, tp]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtpTensor(pub [f64; 6]);

/// Moment tensor components in Voigt order `[tt, pp, rr, rp, rt, tp]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoigtTensor(pub [f64; 6]);

/// Symmetric moment tensor in r, theta, phi coordinates [N·m]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentTensor {
    pub m_rr: f64,
    pub m_tt: f64,
    pub m_pp: f64,
    pub m_rt: f64,
    pub m_rp: f64,
    pub m_tp: f64,
}

impl MomentTensor {
    pub fn new(m_rr: f64, m_tt: f64, m_pp: f64, m_rt: f64, m_rp: f64, m_tp: f64) -> Self {
        Self {
            m_rr,
            m_tt,
            m_pp,
            m_rt,
            m_rp,
            m_tp,
        }
    }

    /// Double-couple tensor from fault angles in degrees and scalar moment.
    ///
    /// The formulas (Udias 17.24) are in the geographic North, East, Down
    /// system, which maps to the geocentric one as
    /// Mtt = Mxx, Mpp = Myy, Mrr = Mzz, Mrp = -Myz, Mrt = Mxz, Mtp = -Mxy.
    pub fn from_strike_dip_rake(strike: f64, dip: f64, rake: f64, m0: f64) -> Self {
        let phi = strike.to_radians();
        let delta = dip.to_radians();
        let lambda = rake.to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_delta, cos_delta) = delta.sin_cos();
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_2phi = (2.0 * phi).sin();
        let cos_2phi = (2.0 * phi).cos();
        let sin_2delta = (2.0 * delta).sin();
        let cos_2delta = (2.0 * delta).cos();

        let m_tt = (-sin_delta * cos_lambda * sin_2phi
            - sin_2delta * sin_phi.powi(2) * sin_lambda)
            * m0;
        let m_pp = (sin_delta * cos_lambda * sin_2phi
            - sin_2delta * cos_phi.powi(2) * sin_lambda)
            * m0;
        let m_rr = sin_2delta * sin_lambda * m0;
        let m_rp = (-cos_phi * sin_lambda * cos_2delta + cos_delta * cos_lambda * sin_phi) * m0;
        let m_rt = (-sin_lambda * sin_phi * cos_2delta - cos_delta * cos_lambda * cos_phi) * m0;
        let m_tp = (-sin_delta * cos_lambda * cos_2phi
            - sin_2delta * sin_2phi * sin_lambda / 2.0)
            * m0;

        Self::new(m_rr, m_tt, m_pp, m_rt, m_rp, m_tp)
    }

    pub fn from_voigt(voigt: &VoigtTensor) -> Self {
        let [tt, pp, rr, rp, rt, tp] = voigt.0;
        Self::new(rr, tt, pp, rt, rp, tp)
    }

    pub fn from_rtp(rtp: &RtpTensor) -> Self {
        let [rr, tt, pp, rt, rp, tp] = rtp.0;
        Self::new(rr, tt, pp, rt, rp, tp)
    }

    pub fn rtp(&self) -> RtpTensor {
        RtpTensor([self.m_rr, self.m_tt, self.m_pp, self.m_rt, self.m_rp, self.m_tp])
    }

    pub fn voigt(&self) -> VoigtTensor {
        VoigtTensor([self.m_tt, self.m_pp, self.m_rr, self.m_rp, self.m_rt, self.m_tp])
    }

    /// Scalar moment M0 [N·m]
    pub fn m0(&self) -> f64 {
        let squares = self.m_rr.powi(2)
            + self.m_tt.powi(2)
            + self.m_pp.powi(2)
            + 2.0 * self.m_rt.powi(2)
            + 2.0 * self.m_rp.powi(2)
            + 2.0 * self.m_tp.powi(2);
        (0.5 * squares).sqrt()
    }

    /// Moment magnitude Mw
    pub fn moment_magnitude(&self) -> f64 {
        moment_magnitude(self.m0())
    }
}

/// Moment magnitude of a scalar moment given in N·m
pub fn moment_magnitude(m0: f64) -> f64 {
    2.0 / 3.0 * m0.log10() - 6.0
}
