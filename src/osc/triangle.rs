use std::f64::consts::FRAC_2_PI;

use super::Oscillator;

#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleOscillator;

impl Oscillator for TriangleOscillator {
    fn at_phase(&self, phase: f64) -> f64 {
        phase.sin().asin() * FRAC_2_PI
    }
}
