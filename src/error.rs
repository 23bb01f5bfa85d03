//! Error types for synth construction and audio output.

use thiserror::Error;

/// Errors raised while configuring the synth or opening an audio stream.
///
/// The render path itself never fails; these only surface at startup.
#[derive(Debug, Error)]
pub enum SynthError {
    /// No audio output device is available on this system.
    #[error("no audio output device available")]
    NoOutputDevice,

    /// Device enumeration or querying failed.
    #[error("audio device error: {0}")]
    Device(String),

    /// Building or starting the output stream failed.
    #[error("audio stream error: {0}")]
    Stream(String),

    /// A raw waveform index that names no known waveform.
    #[error("unknown waveform index: {0}")]
    UnknownWaveform(u8),

    /// An envelope parameter is out of range.
    #[error("invalid envelope parameter '{parameter}': {value}")]
    InvalidEnvelope {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The synth configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Crate-wide result alias.
pub type Result<T, E = SynthError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_envelope_display() {
        let err = SynthError::InvalidEnvelope {
            parameter: "attack",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "invalid envelope parameter 'attack': -1");
    }

    #[test]
    fn no_device_display() {
        assert_eq!(
            SynthError::NoOutputDevice.to_string(),
            "no audio output device available"
        );
    }
}
