//! Note id to frequency mapping on an equal-tempered scale.

/// The twelfth root of two, the frequency ratio between adjacent semitones.
pub const SEMITONE_RATIO: f64 = 1.059_463_094_359_295_3;

/// Frequency of note id 0, in Hz.
pub const BASE_FREQUENCY: f64 = 256.0;

/// Frequency in Hz of the note `note_id` semitones above [`BASE_FREQUENCY`].
///
/// Negative ids go below the base.
pub fn frequency(note_id: i32) -> f64 {
    BASE_FREQUENCY * SEMITONE_RATIO.powi(note_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_twelfth_root_of_two() {
        assert!((SEMITONE_RATIO - 2f64.powf(1.0 / 12.0)).abs() < 1e-15);
        assert!((SEMITONE_RATIO.powi(12) - 2.0).abs() < 1e-14);
    }

    #[test]
    fn id_zero_is_base() {
        assert_eq!(frequency(0), 256.0);
    }

    #[test]
    fn octaves_double() {
        for id in -24..24 {
            let ratio = frequency(id + 12) / frequency(id);
            assert!((ratio - 2.0).abs() < 1e-12, "id {id}: ratio {ratio}");
        }
    }

    #[test]
    fn fifth_is_close_to_just() {
        // seven semitones is within two cents of 3:2
        let ratio = frequency(7) / frequency(0);
        assert!((ratio - 1.5).abs() < 0.002);
    }
}
