/// An amplitude envelope evaluated from a note's timestamps.
///
/// All times are in seconds on the same clock. A note is held while
/// `on_time > off_time` and releasing otherwise.
pub trait Envelope {
    /// Sample the envelope at `time`. The result is in `[0, 1]` and never NaN.
    fn amplitude(&self, time: f64, on_time: f64, off_time: f64) -> f64;

    /// Returns whether the note will not make any sound anymore.
    ///
    /// A held note has never ended, whatever its amplitude.
    fn note_ended(&self, time: f64, on_time: f64, off_time: f64) -> bool;
}

pub mod adsr;
