use super::Oscillator;

/// A hard-edged square: `+1` while the underlying sine is positive, `-1` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareOscillator;

impl Oscillator for SquareOscillator {
    fn at_phase(&self, phase: f64) -> f64 {
        if phase.sin() > 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}
