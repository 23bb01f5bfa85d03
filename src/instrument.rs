//! Timbres built from oscillator taps and an envelope.

use crate::envelope::{adsr::AdsrEnvelope, Envelope};
use crate::note::Note;
use crate::osc::{self, Vibrato, Waveform};
use crate::scale;

/// One oscillator in a timbre recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Pitch offset from the note, in semitones.
    pub semitones: i32,
    pub waveform: Waveform,
    /// Mix weight of this tap.
    pub weight: f64,
    pub vibrato: Vibrato,
}

impl Tap {
    pub fn new(semitones: i32, waveform: Waveform, weight: f64) -> Self {
        Self {
            semitones,
            waveform,
            weight,
            vibrato: Vibrato::NONE,
        }
    }

    pub fn with_vibrato(self, rate: f64, depth: f64) -> Self {
        Self {
            vibrato: Vibrato::new(rate, depth),
            ..self
        }
    }
}

/// The output of an instrument for one note at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sound {
    pub sample: f64,
    /// The envelope has decayed to silence and the note is released, so it can be retired.
    pub finished: bool,
}

/// An immutable timbre: a weighted sum of oscillator taps shaped by an envelope.
///
/// Instruments hold no per-note state and are shared by every note on their channel.
#[derive(Debug, Clone)]
pub struct Instrument<E: Envelope = AdsrEnvelope> {
    taps: Vec<Tap>,
    envelope: E,
    volume: f64,
}

impl<E: Envelope> Instrument<E> {
    pub fn new(envelope: E) -> Self {
        Self {
            taps: Vec::new(),
            envelope,
            volume: 1.0,
        }
    }

    pub fn with_tap(mut self, tap: Tap) -> Self {
        self.taps.push(tap);
        self
    }

    pub fn with_volume(self, volume: f64) -> Self {
        Self { volume, ..self }
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    pub fn envelope(&self) -> &E {
        &self.envelope
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Render `note` at `time`.
    ///
    /// Taps are evaluated at `note.on_time - time`, which anchors every oscillator's
    /// phase to the instant the note was pressed.
    pub fn sound(&self, time: f64, note: &Note) -> Sound {
        let amplitude = self.envelope.amplitude(time, note.on_time, note.off_time);
        if amplitude <= 0.0 {
            return Sound {
                sample: 0.0,
                finished: self
                    .envelope
                    .note_ended(time, note.on_time, note.off_time),
            };
        }

        let t = note.on_time - time;
        let signal: f64 = self
            .taps
            .iter()
            .map(|tap| {
                let hertz = scale::frequency(note.id + tap.semitones);
                tap.weight * osc::sample(t, hertz, tap.waveform, tap.vibrato)
            })
            .sum();

        Sound {
            sample: amplitude * signal * self.volume,
            finished: false,
        }
    }
}

impl Instrument {
    /// Sine partials one to three octaves up with a fast strike and a long fade.
    pub fn bell() -> Self {
        Instrument::new(AdsrEnvelope::new(0.01, 1.0, 0.0, 1.0))
            .with_tap(Tap::new(12, Waveform::Sine, 1.0).with_vibrato(5.0, 0.001))
            .with_tap(Tap::new(24, Waveform::Sine, 0.5))
            .with_tap(Tap::new(36, Waveform::Sine, 0.25))
    }

    /// A square fundamental with an octave overtone and a breath of noise.
    pub fn harmonica() -> Self {
        Instrument::new(AdsrEnvelope::new(0.05, 1.0, 0.95, 0.1))
            .with_tap(Tap::new(0, Waveform::Square, 1.0).with_vibrato(5.0, 0.001))
            .with_tap(Tap::new(12, Waveform::Square, 0.5))
            .with_tap(Tap::new(24, Waveform::Noise, 0.05))
    }
}
