//! Mapping from physical keys to notes, and the per-tick reconciliation that turns
//! key states into registry updates.

use crate::envelope::Envelope;
use crate::note::Channel;
use crate::registry::Transition;
use crate::Synth;

/// A physical key bound to a note id on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: char,
    pub id: i32,
    pub channel: Channel,
}

/// A fixed table of key bindings.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

/// One chromatic octave on the bottom row, played by the harmonica.
const HARMONICA_KEYS: &str = "zsxdcvgbhnjm";
/// The next four semitones, played by the bell.
const BELL_KEYS: &str = ",l.;";

impl Default for KeyMap {
    /// Sixteen keys, ids 0 to 15: the first twelve on channel 1, the last four on channel 2.
    ///
    /// ```plaintext
    /// |   |   | |   |   |   |   | |   | |   |   |   | |   |
    /// |   | S | | D |   |   | G | | H | | J |   |   | | L |
    /// |   |___| |___|   |   |___| |___| |___|   |   | |___|
    /// |     |     |     |     |     |     |     |     |     |
    /// |  Z  |  X  |  C  |  V  |  B  |  N  |  M  |  ,  |  .  |
    /// |_____|_____|_____|_____|_____|_____|_____|_____|_____|
    /// ```
    ///
    /// `;` sits one semitone above `.`.
    fn default() -> Self {
        let harmonica = HARMONICA_KEYS.chars().map(|key| (key, Channel::HARMONICA));
        let bell = BELL_KEYS.chars().map(|key| (key, Channel::BELL));
        let bindings = harmonica
            .chain(bell)
            .enumerate()
            .map(|(id, (key, channel))| KeyBinding {
                key,
                id: id as i32,
                channel,
            })
            .collect();
        Self { bindings }
    }
}

impl KeyMap {
    pub fn new(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// The binding for `key`, ignoring case.
    pub fn binding(&self, key: char) -> Option<&KeyBinding> {
        let key = key.to_ascii_lowercase();
        self.bindings.iter().find(|b| b.key == key)
    }

    /// Reconcile every bound key with the synth's notes at `time`.
    ///
    /// `is_down` reports whether a key is currently pressed. Returns the bindings whose
    /// notes changed, with what happened to each.
    pub fn poll<E: Envelope>(
        &self,
        synth: &Synth<E>,
        time: f64,
        mut is_down: impl FnMut(char) -> bool,
    ) -> Vec<(KeyBinding, Transition)> {
        let mut changed = Vec::new();
        for binding in &self.bindings {
            let transition = if is_down(binding.key) {
                synth.key_down(binding.id, binding.channel, time)
            } else {
                synth.key_up(binding.id, time)
            };
            if transition != Transition::Unchanged {
                changed.push((*binding, transition));
            }
        }
        changed
    }
}
