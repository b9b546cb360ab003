//! Butterworth lowpass filtering of real sample series
//!
//! The filter is a cascade of second-order sections designed with the
//! bilinear transform. Each call starts from a zero state. With `zerophase`
//! the series is filtered forward and then backward, which squares the
//! magnitude response and cancels the phase.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::{Result, SourceError};

/// A single biquad (second-order section)
///
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2), evaluated in
/// Direct Form II Transposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalized to 1)
    a: [f64; 2],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self { b, a }
    }

    /// Gain at z = 1
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Stability triangle for 1 + a1*z^-1 + a2*z^-2
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }

    fn run(&self, data: &mut [f64]) {
        let mut state = [0.0; 2];
        for sample in data.iter_mut() {
            let input = *sample;
            let output = self.b[0] * input + state[0];
            state[0] = self.b[1] * input - self.a[0] * output + state[1];
            state[1] = self.b[2] * input - self.a[1] * output;
            *sample = output;
        }
    }
}

/// Butterworth lowpass as a cascade of biquads with unit DC gain
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthLowpass {
    sections: Vec<Biquad>,
    order: usize,
}

impl ButterworthLowpass {
    /// Design a lowpass with `corners` poles and a -3 dB point at `freq` [Hz]
    /// for data sampled at `sampling_rate` [Hz].
    pub fn design(freq: f64, sampling_rate: f64, corners: usize) -> Result<Self> {
        if corners == 0 {
            return Err(SourceError::Validation(
                "lowpass needs at least one corner".to_string(),
            ));
        }
        if !(sampling_rate > 0.0) || !sampling_rate.is_finite() {
            return Err(SourceError::Validation(format!(
                "invalid sampling rate {sampling_rate}"
            )));
        }
        if !(freq > 0.0) || freq >= 0.5 * sampling_rate {
            return Err(SourceError::Validation(format!(
                "lowpass corner {freq} Hz must lie in (0, {}) Hz",
                0.5 * sampling_rate
            )));
        }

        // Pre-warp the corner for the bilinear transform
        let k = 2.0 * sampling_rate;
        let wc = k * (PI * freq / sampling_rate).tan();

        let mut sections = Vec::with_capacity(corners.div_ceil(2));
        for idx in 0..corners {
            let theta = PI * (2 * idx + corners + 1) as f64 / (2 * corners) as f64;
            let pole_s = Complex64::from_polar(wc, theta);
            let pole_z = (k + pole_s) / (k - pole_s);

            if pole_s.im > 1e-12 * wc {
                // Conjugate pair with both zeros at z = -1
                let a = [-2.0 * pole_z.re, pole_z.norm_sqr()];
                let gain = (1.0 + a[0] + a[1]) / 4.0;
                sections.push(Biquad::new([gain, 2.0 * gain, gain], a));
            } else if pole_s.im.abs() <= 1e-12 * wc {
                // Single real pole of an odd order
                let a = [-pole_z.re, 0.0];
                let gain = (1.0 + a[0]) / 2.0;
                sections.push(Biquad::new([gain, gain, 0.0], a));
            }
        }

        Ok(Self {
            sections,
            order: corners,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Causal single pass
    pub fn filter(&self, data: &[f64]) -> Vec<f64> {
        let mut out = data.to_vec();
        for section in &self.sections {
            section.run(&mut out);
        }
        out
    }

    /// Forward pass followed by a backward pass
    pub fn filter_zerophase(&self, data: &[f64]) -> Vec<f64> {
        let mut out = self.filter(data);
        out.reverse();
        let mut out = self.filter(&out);
        out.reverse();
        out
    }
}

/// Lowpass `data` sampled at `sampling_rate` [Hz].
///
/// A corner at or above the Nyquist frequency leaves the data untouched.
pub fn lowpass(
    data: &[f64],
    freq: f64,
    sampling_rate: f64,
    corners: usize,
    zerophase: bool,
) -> Result<Vec<f64>> {
    if freq >= 0.5 * sampling_rate {
        tracing::warn!(
            freq,
            nyquist = 0.5 * sampling_rate,
            "lowpass corner is above Nyquist, leaving data unfiltered"
        );
        return Ok(data.to_vec());
    }

    let filter = ButterworthLowpass::design(freq, sampling_rate, corners)?;
    Ok(if zerophase {
        filter.filter_zerophase(data)
    } else {
        filter.filter(data)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_section_count_and_stability() {
        let even = ButterworthLowpass::design(1.0, 20.0, 4).unwrap();
        assert_eq!(even.sections().len(), 2);
        let odd = ButterworthLowpass::design(1.0, 20.0, 5).unwrap();
        assert_eq!(odd.sections().len(), 3);
        assert!(odd.sections().iter().all(Biquad::is_stable));
        for section in odd.sections() {
            assert_relative_eq!(section.dc_gain(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_response_settles_to_one() {
        let filter = ButterworthLowpass::design(2.0, 100.0, 4).unwrap();
        let out = filter.filter(&vec![1.0; 2000]);
        assert_relative_eq!(*out.last().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_attenuates_high_frequency() {
        let fs = 100.0;
        let tone: Vec<f64> = (0..4000)
            .map(|i| (2.0 * PI * 30.0 * i as f64 / fs).sin())
            .collect();
        let out = lowpass(&tone, 2.0, fs, 4, true).unwrap();
        let peak = out[1000..3000].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(peak < 1e-3);
    }

    #[test]
    fn test_zerophase_keeps_symmetric_pulse_centered() {
        let mut pulse = vec![0.0; 401];
        pulse[200] = 1.0;
        let out = lowpass(&pulse, 5.0, 100.0, 2, true).unwrap();
        let peak_idx = out
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0;
        assert_eq!(peak_idx, 200);
    }

    #[test]
    fn test_rejects_bad_design_parameters() {
        assert!(ButterworthLowpass::design(1.0, 20.0, 0).is_err());
        assert!(ButterworthLowpass::design(-1.0, 20.0, 4).is_err());
        assert!(ButterworthLowpass::design(10.0, 20.0, 4).is_err());
    }

    #[test]
    fn test_corner_above_nyquist_is_passthrough() {
        let data = vec![1.0, -1.0, 2.0];
        assert_eq!(lowpass(&data, 50.0, 20.0, 4, false).unwrap(), data);
    }
}
