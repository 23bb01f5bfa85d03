use std::f64::consts::FRAC_2_PI;

use super::Oscillator;

/// A band-limited saw built from the first `terms - 1` harmonics, each at `1/n` amplitude.
#[derive(Debug, Clone, Copy)]
pub struct SawOscillator {
    terms: u32,
}

impl SawOscillator {
    pub fn new(terms: u32) -> Self {
        Self { terms }
    }
}

impl Default for SawOscillator {
    fn default() -> Self {
        Self::new(super::DEFAULT_SAW_TERMS)
    }
}

impl Oscillator for SawOscillator {
    fn at_phase(&self, phase: f64) -> f64 {
        let mut output = 0.0;
        for n in 1..self.terms {
            let n = n as f64;
            output += (n * phase).sin() / n;
        }
        output * FRAC_2_PI
    }
}
