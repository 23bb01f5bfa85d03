pub mod noise;
pub mod saw;
pub mod sine;
pub mod square;
pub mod triangle;

use std::f64::consts::PI;

use crate::error::SynthError;

use self::{
    noise::NoiseOscillator, saw::SawOscillator, sine::SineOscillator, square::SquareOscillator,
    triangle::TriangleOscillator,
};

/// Number of terms the additive saw uses unless told otherwise.
pub const DEFAULT_SAW_TERMS: u32 = 50;

pub trait Oscillator {
    /// Evaluate the waveform at an angular phase, in radians.
    ///
    /// Implementations hold no per-voice state, so the same oscillator can be sampled
    /// from any thread at any time.
    fn at_phase(&self, phase: f64) -> f64;
}

/// The waveform kinds an instrument tap can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Saw,
    Noise,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Saw,
        Waveform::Noise,
    ];

    fn at_phase(self, phase: f64, saw_terms: u32) -> f64 {
        match self {
            Waveform::Sine => SineOscillator.at_phase(phase),
            Waveform::Square => SquareOscillator.at_phase(phase),
            Waveform::Triangle => TriangleOscillator.at_phase(phase),
            Waveform::Saw => SawOscillator::new(saw_terms).at_phase(phase),
            Waveform::Noise => NoiseOscillator.at_phase(phase),
        }
    }
}

impl TryFrom<u8> for Waveform {
    type Error = SynthError;

    /// Raw indices: 0 sine, 1 square, 2 triangle, 3 saw, 4 noise.
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Waveform::ALL
            .get(index as usize)
            .copied()
            .ok_or(SynthError::UnknownWaveform(index))
    }
}

/// Frequency modulation applied on top of the carrier.
///
/// `rate` is the LFO frequency in Hz. `depth` scales the phase deviation, which is
/// `depth * freq * sin(2π * rate * t)`, so deeper vibrato bends higher notes further.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vibrato {
    pub rate: f64,
    pub depth: f64,
}

impl Vibrato {
    pub const NONE: Vibrato = Vibrato {
        rate: 0.0,
        depth: 0.0,
    };

    pub fn new(rate: f64, depth: f64) -> Self {
        Self { rate, depth }
    }
}

/// Convert a frequency in Hz to angular velocity in radians per second.
pub fn angular_velocity(hertz: f64) -> f64 {
    hertz * 2.0 * PI
}

/// The angular phase of a carrier at `time` seconds, including vibrato.
pub fn phase(time: f64, hertz: f64, vibrato: Vibrato) -> f64 {
    angular_velocity(hertz) * time
        + vibrato.depth * hertz * (angular_velocity(vibrato.rate) * time).sin()
}

/// Sample a waveform at `time` seconds.
///
/// The result lies in `[-1, 1]`, except for the additive saw which can overshoot
/// slightly near its edge.
pub fn sample(time: f64, hertz: f64, waveform: Waveform, vibrato: Vibrato) -> f64 {
    sample_with_terms(time, hertz, waveform, vibrato, DEFAULT_SAW_TERMS)
}

/// Like [`sample`], with an explicit number of saw terms. More terms give a sharper edge
/// at linear cost per call.
pub fn sample_with_terms(
    time: f64,
    hertz: f64,
    waveform: Waveform,
    vibrato: Vibrato,
    saw_terms: u32,
) -> f64 {
    waveform.at_phase(phase(time, hertz, vibrato), saw_terms)
}

/// Sample a waveform given by its raw index. Unknown indices produce silence.
pub fn sample_kind(time: f64, hertz: f64, kind: u8, vibrato: Vibrato) -> f64 {
    match Waveform::try_from(kind) {
        Ok(waveform) => sample(time, hertz, waveform, vibrato),
        Err(_) => 0.0,
    }
}
