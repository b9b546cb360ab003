//! Frequency-domain time shifting of real series
//!
//! A shift by a fractional number of samples is applied as a linear phase
//! ramp on the spectrum of the zero-padded series. Only the non-negative
//! half of the spectrum is shifted; the negative half is rebuilt as its
//! conjugate so the inverse transform is real.

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::{Result, SourceError};

/// Smallest power of two that is >= `n` (1 for n = 0)
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Planned forward/inverse transforms of one length, shareable across threads
#[derive(Clone)]
pub struct SpectralShifter {
    nfft: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for SpectralShifter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralShifter")
            .field("nfft", &self.nfft)
            .finish()
    }
}

impl SpectralShifter {
    /// Plan transforms of length `nfft`, which must be even and non-zero
    pub fn new(nfft: usize) -> Result<Self> {
        if nfft < 2 || nfft % 2 != 0 {
            return Err(SourceError::Validation(format!(
                "transform length must be even and at least 2, got {nfft}"
            )));
        }
        Ok(Self::plan(nfft))
    }

    fn plan(nfft: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nfft,
            forward: planner.plan_fft_forward(nfft),
            inverse: planner.plan_fft_inverse(nfft),
        }
    }

    /// Transform length suited to series of `nsamp` samples without wrap-around
    pub fn for_samples(nsamp: usize) -> Self {
        Self::plan(2 * next_pow2(nsamp))
    }

    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Delay `samples` by `shift` samples (may be fractional or negative)
    /// and return the first `nout` samples of the result.
    ///
    /// Input longer than `nfft` is truncated before the transform. A series
    /// shifted entirely outside `[0, nout)` yields zeros. Other shifts do not
    /// wrap around as long as neither the input nor `nout` exceeds `nfft / 2`.
    pub fn shift(&self, samples: &[f64], shift: f64, nout: usize) -> Vec<f64> {
        let len = samples.len().min(self.nfft);
        if shift >= nout as f64 || shift + len as f64 <= 0.0 {
            return vec![0.0; nout];
        }

        let n = self.nfft;
        let half = n / 2;

        let mut buffer: Vec<Complex64> = samples
            .iter()
            .take(n)
            .map(|&s| Complex64::new(s, 0.0))
            .collect();
        buffer.resize(n, Complex64::new(0.0, 0.0));

        self.forward.process(&mut buffer);

        for (k, bin) in buffer.iter_mut().enumerate().take(half + 1) {
            let freq = k as f64 / n as f64;
            *bin *= Complex64::from_polar(1.0, -2.0 * PI * freq * shift);
        }
        // DC and Nyquist bins of a real series are real
        buffer[0].im = 0.0;
        buffer[half].im = 0.0;
        for k in 1..half {
            buffer[n - k] = buffer[k].conj();
        }

        self.inverse.process(&mut buffer);

        let scale = 1.0 / n as f64;
        buffer
            .iter()
            .take(nout.min(n))
            .map(|c| c.re * scale)
            .chain(std::iter::repeat(0.0))
            .take(nout)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_next_pow2() {
        assert_eq!(next_pow2(0), 1);
        assert_eq!(next_pow2(1), 1);
        assert_eq!(next_pow2(5), 8);
        assert_eq!(next_pow2(64), 64);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let shifter = SpectralShifter::for_samples(5);
        let data = [0.5, 1.0, -2.0, 3.0, 0.25];
        let out = shifter.shift(&data, 0.0, 5);
        for (a, b) in out.iter().zip(data.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_integer_shift_moves_impulse() {
        let shifter = SpectralShifter::for_samples(16);
        let mut data = vec![0.0; 16];
        data[0] = 1.0;
        let out = shifter.shift(&data, 3.0, 16);
        for (i, value) in out.iter().enumerate() {
            let expected = if i == 3 { 1.0 } else { 0.0 };
            assert_relative_eq!(*value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shift_past_window_contributes_nothing() {
        let shifter = SpectralShifter::for_samples(4);
        let data = [1.0, 0.0, 0.0, 0.0];
        // 9 samples late with nfft = 8 would fold back to sample 1
        assert_eq!(shifter.shift(&data, 9.0, 4), vec![0.0; 4]);
        assert_eq!(shifter.shift(&data, 4.0, 4), vec![0.0; 4]);
        assert_eq!(shifter.shift(&data, -4.0, 4), vec![0.0; 4]);

        let out = shifter.shift(&data, 3.0, 4);
        assert_relative_eq!(out[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_new_rejects_odd_length() {
        assert!(SpectralShifter::new(0).is_err());
        assert!(SpectralShifter::new(7).is_err());
        assert_eq!(SpectralShifter::new(16).unwrap().nfft(), 16);
    }

    #[test]
    fn test_fractional_shift_preserves_area() {
        let shifter = SpectralShifter::for_samples(32);
        let data: Vec<f64> = (0..32).map(|i| (-(i as f64 - 8.0).powi(2) / 8.0).exp()).collect();
        let out = shifter.shift(&data, 2.5, 64);
        let before: f64 = data.iter().sum();
        let after: f64 = out.iter().sum();
        assert_relative_eq!(before, after, epsilon = 1e-9);
    }
}
