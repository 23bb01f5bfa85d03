pub mod envelope;
pub mod error;
pub mod instrument;
pub mod keyboard;
pub mod note;
pub mod osc;
pub mod output;
pub mod registry;
pub mod scale;

use envelope::{adsr::AdsrEnvelope, Envelope};
use instrument::Instrument;
use note::Channel;
use registry::{NoteRegistry, Transition};

pub use error::{Result, SynthError};

#[derive(Debug, Clone)]
pub struct Config {
    /// The sample rate of the audio stream, in Hz.
    pub sample_rate: u32,
    /// The number of output channels. Every channel carries the same mono mix.
    pub channels: u16,
    /// A fixed buffer size in frames, or `None` to let the device choose.
    pub buffer_size: Option<u32>,
    /// The most notes that can sound at once before the oldest is stolen.
    pub max_notes: usize,
    /// Scale applied to the summed notes so that chords do not clip.
    pub headroom: f64,
}

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_MAX_NOTES: usize = 64;
pub const DEFAULT_HEADROOM: f64 = 0.4;

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            buffer_size: None,
            max_notes: DEFAULT_MAX_NOTES,
            headroom: DEFAULT_HEADROOM,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidConfig("sample rate must be positive".into()));
        }
        if self.channels == 0 {
            return Err(SynthError::InvalidConfig("at least one channel is required".into()));
        }
        if self.buffer_size == Some(0) {
            return Err(SynthError::InvalidConfig("buffer size must be positive".into()));
        }
        if self.max_notes == 0 {
            return Err(SynthError::InvalidConfig("max_notes must be positive".into()));
        }
        if !self.headroom.is_finite() || self.headroom < 0.0 {
            return Err(SynthError::InvalidConfig(format!(
                "headroom must be a non-negative number, got {}",
                self.headroom
            )));
        }
        Ok(())
    }
}

/// An instrument routed to a channel, with that channel's gain in the mix.
pub struct ChannelStrip<E: Envelope = AdsrEnvelope> {
    pub channel: Channel,
    pub instrument: Instrument<E>,
    pub gain: f64,
}

impl<E: Envelope> ChannelStrip<E> {
    pub fn new(channel: Channel, instrument: Instrument<E>, gain: f64) -> Self {
        Self {
            channel,
            instrument,
            gain,
        }
    }
}

/// The synthesis engine: instruments, their routing, and the notes being played.
///
/// `Synth` is shared between the audio thread, which calls [`Synth::render_sample`],
/// and the input thread, which calls [`Synth::key_down`] and [`Synth::key_up`].
pub struct Synth<E: Envelope = AdsrEnvelope> {
    /// The configuration of the synth.
    cfg: Config,

    /// Instruments by channel.
    strips: Vec<ChannelStrip<E>>,

    /// Notes currently being played.
    notes: NoteRegistry,
}

impl Synth {
    /// The two-instrument keyboard: harmonica on channel 1 at half gain, bell on channel 2.
    pub fn new(cfg: Config) -> Result<Self> {
        Self::with_channels(
            cfg,
            vec![
                ChannelStrip::new(Channel::HARMONICA, Instrument::harmonica(), 0.5),
                ChannelStrip::new(Channel::BELL, Instrument::bell(), 1.0),
            ],
        )
    }
}

impl<E: Envelope> Synth<E> {
    pub fn with_channels(cfg: Config, strips: Vec<ChannelStrip<E>>) -> Result<Self> {
        cfg.validate()?;
        for (i, strip) in strips.iter().enumerate() {
            if strips[..i].iter().any(|s| s.channel == strip.channel) {
                return Err(SynthError::InvalidConfig(format!(
                    "channel {} is routed twice",
                    strip.channel.0
                )));
            }
        }
        Ok(Self {
            notes: NoteRegistry::new(cfg.max_notes),
            cfg,
            strips,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn notes(&self) -> &NoteRegistry {
        &self.notes
    }

    pub fn strip(&self, channel: Channel) -> Option<&ChannelStrip<E>> {
        self.strips.iter().find(|s| s.channel == channel)
    }

    pub fn key_down(&self, id: i32, channel: Channel, time: f64) -> Transition {
        self.notes.key_down(id, channel, time)
    }

    pub fn key_up(&self, id: i32, time: f64) -> Transition {
        self.notes.key_up(id, time)
    }

    /// How many notes are sounding. For display only.
    pub fn active_notes(&self) -> usize {
        self.notes.len()
    }

    /// Mix every note at `time` into one sample in `[-1, 1]`, retiring notes that
    /// have been released and have faded out.
    ///
    /// The note list stays locked for the whole pass, so key events land either
    /// before or after it. Logging waits until the lock is released.
    pub fn render_sample(&self, time: f64) -> f64 {
        let mut notes = self.notes.lock();
        let mut mixed = 0.0;
        let mut retired = 0usize;

        notes.for_each_mut(|note| {
            let (sample, finished) = match self.strip(note.channel) {
                Some(strip) => {
                    let sound = strip.instrument.sound(time, note);
                    (sound.sample * strip.gain, sound.finished)
                }
                None => (0.0, true),
            };
            mixed += sample;

            if finished && !note.is_held() {
                note.active = false;
                retired += 1;
            }
        });
        notes.prune_inactive();
        drop(notes);

        if retired > 0 {
            tracing::trace!(retired, time, "notes retired");
        }

        let out = mixed * self.cfg.headroom;
        if out.is_nan() {
            0.0
        } else {
            out.clamp(-1.0, 1.0)
        }
    }

    /// Fill `buffer` with consecutive samples, the first at `start_time`.
    /// Returns the time of the sample after the buffer.
    pub fn render(&self, buffer: &mut [f32], start_time: f64) -> f64 {
        let delta_t = 1.0 / self.cfg.sample_rate as f64;
        for (i, out) in buffer.iter_mut().enumerate() {
            *out = self.render_sample(start_time + i as f64 * delta_t) as f32;
        }
        start_time + buffer.len() as f64 * delta_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument::Tap;
    use osc::Waveform;

    fn steady_sine() -> Instrument {
        Instrument::new(AdsrEnvelope::new(0.0, 0.0, 1.0, 0.1))
            .with_tap(Tap::new(0, Waveform::Sine, 1.0))
    }

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.sample_rate, 44_100);
        assert_eq!(cfg.channels, 1);
        assert_eq!(cfg.headroom, 0.4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        let bad = [
            Config {
                sample_rate: 0,
                ..Default::default()
            },
            Config {
                channels: 0,
                ..Default::default()
            },
            Config {
                buffer_size: Some(0),
                ..Default::default()
            },
            Config {
                max_notes: 0,
                ..Default::default()
            },
            Config {
                headroom: f64::NAN,
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(SynthError::InvalidConfig(_))));
        }
    }

    #[test]
    fn rejects_duplicate_routes() {
        let result = Synth::with_channels(
            Config::default(),
            vec![
                ChannelStrip::new(Channel(1), steady_sine(), 1.0),
                ChannelStrip::new(Channel(1), steady_sine(), 0.5),
            ],
        );
        assert!(matches!(result, Err(SynthError::InvalidConfig(_))));
    }

    #[test]
    fn silence_without_notes() {
        let synth = Synth::new(Config::default()).unwrap();
        assert_eq!(synth.render_sample(0.0), 0.0);
        assert_eq!(synth.render_sample(1.0), 0.0);
    }

    #[test]
    fn mixes_with_channel_gain_and_headroom() {
        let synth = Synth::with_channels(
            Config::default(),
            vec![ChannelStrip::new(Channel(1), steady_sine(), 0.5)],
        )
        .unwrap();
        synth.key_down(0, Channel(1), 0.0);
        let time = 0.0011;
        let expected =
            osc::sample(-time, scale::frequency(0), Waveform::Sine, osc::Vibrato::NONE) * 0.5 * 0.4;
        assert!((synth.render_sample(time) - expected).abs() < 1e-12);
    }

    #[test]
    fn notes_add_up() {
        let synth = Synth::with_channels(
            Config {
                headroom: 1.0,
                ..Default::default()
            },
            vec![
                ChannelStrip::new(Channel(1), steady_sine(), 0.25),
                ChannelStrip::new(Channel(2), steady_sine(), 0.25),
            ],
        )
        .unwrap();
        synth.key_down(0, Channel(1), 0.0);
        let one = synth.render_sample(0.0021);
        synth.key_down(1, Channel(2), 0.0);
        let two = synth.render_sample(0.0021);
        let second =
            0.25 * osc::sample(-0.0021, scale::frequency(1), Waveform::Sine, osc::Vibrato::NONE);
        assert!((two - one - second).abs() < 1e-12);
    }

    #[test]
    fn retires_released_notes_after_fade() {
        let synth = Synth::with_channels(
            Config::default(),
            vec![ChannelStrip::new(Channel(1), steady_sine(), 1.0)],
        )
        .unwrap();
        synth.key_down(0, Channel(1), 0.0);
        synth.key_up(0, 0.5);
        synth.render_sample(0.55);
        assert_eq!(synth.active_notes(), 1);
        synth.render_sample(0.61);
        assert_eq!(synth.active_notes(), 0);
    }

    #[test]
    fn held_notes_are_never_retired() {
        let synth = Synth::new(Config::default()).unwrap();
        // the bell has no sustain, so it is silent long before this
        synth.key_down(12, Channel::BELL, 0.0);
        for time in [2.0, 10.0, 100.0] {
            assert_eq!(synth.render_sample(time), 0.0);
            assert_eq!(synth.active_notes(), 1);
        }
    }

    #[test]
    fn unrouted_channel_is_silent_and_retires_on_release() {
        let synth = Synth::new(Config::default()).unwrap();
        synth.key_down(0, Channel(9), 0.0);
        assert_eq!(synth.render_sample(0.3), 0.0);
        assert_eq!(synth.active_notes(), 1);
        synth.key_up(0, 0.4);
        synth.render_sample(0.41);
        assert_eq!(synth.active_notes(), 0);
    }

    #[test]
    fn output_is_clamped() {
        let loud = Instrument::new(AdsrEnvelope::immediate())
            .with_tap(Tap::new(0, Waveform::Square, 10.0));
        let synth = Synth::with_channels(
            Config {
                headroom: 1.0,
                ..Default::default()
            },
            vec![ChannelStrip::new(Channel(1), loud, 1.0)],
        )
        .unwrap();
        synth.key_down(0, Channel(1), 0.0);
        let s = synth.render_sample(0.001);
        assert_eq!(s.abs(), 1.0);
    }

    #[test]
    fn render_fills_buffer() {
        let synth = Synth::new(Config::default()).unwrap();
        synth.key_down(0, Channel::HARMONICA, 0.0);
        let mut buffer = vec![0.0f32; 441];
        let next = synth.render(&mut buffer, 0.0);
        assert!((next - 0.01).abs() < 1e-12);
        assert_eq!(buffer[0], 0.0);
        assert!(buffer.iter().any(|s| *s != 0.0));
        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
    }
}
