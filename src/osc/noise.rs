use super::Oscillator;

use rand::Rng;

/// White noise. The phase is ignored and every call draws a fresh value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseOscillator;

impl Oscillator for NoiseOscillator {
    fn at_phase(&self, _phase: f64) -> f64 {
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}
