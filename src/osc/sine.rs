use super::Oscillator;

#[derive(Debug, Clone, Copy, Default)]
pub struct SineOscillator;

impl Oscillator for SineOscillator {
    fn at_phase(&self, phase: f64) -> f64 {
        phase.sin()
    }
}
