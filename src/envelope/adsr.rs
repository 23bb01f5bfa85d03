use crate::error::{Result, SynthError};

use super::Envelope;

/// A linear ADSR envelope configuration. All times are in seconds.
///
/// ```plaintext
/// amplitude
/// ^
/// |     /|\
/// |    / | \
/// |   /  |  +---------------+\ -  -  -  -  -  -  -  +
/// |  /   |  |               | \                     | Sustain
/// +-+----+--+---------------+--+------> time  -  -  +
///   |    |  |               +--+ Release
///   |    |  |               (note is released)
///   |    +--+ Decay
/// t=0----+ Attack
/// ```
///
/// Nothing is remembered about the level at the moment of release. The release ramp
/// starts from a level that replays attack and decay against the time since release,
/// with the attack rising toward `sustain`, and then fades it to 0 over `release`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    /// The time it takes for the envelope to reach `start`.
    pub attack: f64,
    /// The time it takes for the envelope to fall from `start` to `sustain`.
    pub decay: f64,
    /// The amplitude of the envelope while the note is held.
    pub sustain: f64,
    /// The time it takes for the envelope to reach 0 after the note is released.
    pub release: f64,
    /// The peak reached at the end of the attack.
    pub start: f64,
}

impl AdsrEnvelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            start: 1.0,
        }
    }

    /// Like [`AdsrEnvelope::new`] with an explicit peak, rejecting negative or
    /// non-finite durations and levels outside `[0, 1]`.
    pub fn try_new(attack: f64, decay: f64, sustain: f64, release: f64, start: f64) -> Result<Self> {
        let env = Self {
            attack,
            decay,
            sustain,
            release,
            start,
        };
        env.validate()?;
        Ok(env)
    }

    pub fn with_start(self, start: f64) -> Self {
        Self { start, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ];
        for (parameter, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(SynthError::InvalidEnvelope { parameter, value });
            }
        }
        for (parameter, value) in [("sustain", self.sustain), ("start", self.start)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SynthError::InvalidEnvelope { parameter, value });
            }
        }
        Ok(())
    }

    pub fn immediate() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.0)
    }

    /// The amplitude of a held note `life` seconds after it was pressed.
    fn held(&self, life: f64) -> f64 {
        self.segments(life, self.start)
    }

    /// The level the release ramp fades from, `since_off` seconds after release.
    fn release_level(&self, since_off: f64) -> f64 {
        self.segments(since_off, self.sustain)
    }

    fn segments(&self, life: f64, attack_peak: f64) -> f64 {
        if life <= self.attack {
            ramp(0.0, attack_peak, life, self.attack)
        } else if life <= self.attack + self.decay {
            ramp(self.start, self.sustain, life - self.attack, self.decay)
        } else {
            self.sustain
        }
    }
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(0.1, 0.1, 1.0, 0.2)
    }
}

/// Linear interpolation from `from` to `to` over `duration`. A zero-length segment
/// jumps straight to `to`.
fn ramp(from: f64, to: f64, elapsed: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        from + (to - from) * (elapsed / duration)
    } else {
        to
    }
}

impl Envelope for AdsrEnvelope {
    fn amplitude(&self, time: f64, on_time: f64, off_time: f64) -> f64 {
        let amplitude = if on_time > off_time {
            self.held(time - on_time)
        } else {
            let elapsed = (time - off_time).max(0.0);
            ramp(self.release_level(elapsed), 0.0, elapsed, self.release)
        };

        // also catches NaN
        if amplitude > 0.0 {
            amplitude
        } else {
            0.0
        }
    }

    fn note_ended(&self, time: f64, on_time: f64, off_time: f64) -> bool {
        on_time <= off_time && time - off_time >= self.release
    }
}
