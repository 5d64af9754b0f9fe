//! Letter-to-pitch melody renderer.
//!
//! Each letter of a sentence becomes one note of fixed length; spaces become
//! rests of the same length. Notes are concatenated without overlap.

use crate::config::{MelodyConfig, halftones};
use crate::dsp::clock::SampleClock;
use crate::dsp::encoder::PcmFrame;
use crate::dsp::envelope::AsdEnvelope;
use crate::dsp::oscillator::sine_at;
use crate::error::{MelodyError, ToneError};

/// Semitone offset of each letter A..Z above the base pitch.
pub const LETTER_SEMITONES: [u8; 26] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
];

/// Note name of each letter with the default 247 Hz (B3) base.
pub const LETTER_NAMES: [&str; 26] = [
    "B3", //
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", //
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5", //
    "C6",
];

/// One segment of the melody.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Note {
    Tone { letter: char, frequency: f64 },
    Rest,
}

/// Map a sentence to notes. Lowercase ASCII letters are folded to uppercase;
/// anything other than A–Z and space is rejected.
pub fn parse_sentence(sentence: &str, base_frequency: f64) -> Result<Vec<Note>, MelodyError> {
    sentence
        .char_indices()
        .enumerate()
        .map(|(index, (byte_pos, ch))| match ch.to_ascii_uppercase() {
            letter @ 'A'..='Z' => {
                let slot = (letter as u8 - b'A') as usize;
                log::debug!("{letter} -> {}", LETTER_NAMES[slot]);
                Ok(Note::Tone {
                    letter,
                    frequency: base_frequency * halftones(LETTER_SEMITONES[slot] as f64),
                })
            }
            ' ' => Ok(Note::Rest),
            _ => Err(MelodyError {
                ch,
                index,
                span: byte_pos..byte_pos + ch.len_utf8(),
            }),
        })
        .collect()
}

/// A finite melody stream.
#[derive(Debug, Clone)]
pub struct MelodyEngine {
    clock: SampleClock,
    notes: Vec<Note>,
    envelope: AsdEnvelope,
    amplitude: f64,
    note: usize,
    position: u64,
}

impl MelodyEngine {
    pub fn new(config: &MelodyConfig) -> Result<Self, ToneError> {
        config.validate()?;
        let notes = parse_sentence(&config.sentence, config.base_frequency)?;
        let clock = SampleClock::CD;
        let envelope = AsdEnvelope::new(config.attack_samples, config.sustain_samples, config.decay_samples);

        let ms = |samples: u64| 1000.0 * clock.samples_to_seconds(samples);
        log::info!(
            "Each beep will be {:.0} + {:.0} + {:.0} = {:.0} ms long.",
            ms(envelope.attack),
            ms(envelope.sustain),
            ms(envelope.decay),
            ms(envelope.len())
        );

        Ok(MelodyEngine {
            clock,
            notes,
            envelope,
            amplitude: config.amplitude,
            note: 0,
            position: 0,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Frames per note or rest.
    pub fn segment_frames(&self) -> u64 {
        self.envelope.len()
    }

    pub fn total_frames(&self) -> u64 {
        self.segment_frames() * self.notes.len() as u64
    }
}

impl Iterator for MelodyEngine {
    type Item = PcmFrame;

    fn next(&mut self) -> Option<PcmFrame> {
        let note = *self.notes.get(self.note)?;
        let value = match note {
            Note::Tone { frequency, .. } => {
                self.amplitude
                    * self.envelope.level(self.position)
                    * sine_at(&self.clock, frequency, self.position)
            }
            Note::Rest => 0.0,
        };
        self.position += 1;
        if self.position >= self.envelope.len() {
            self.position = 0;
            self.note += 1;
        }
        Some(PcmFrame::mono(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let done = self.note as u64 * self.segment_frames() + self.position;
        let left = self.total_frames().saturating_sub(done) as usize;
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody(sentence: &str) -> MelodyConfig {
        MelodyConfig {
            sentence: sentence.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn table_spans_two_octaves() {
        assert_eq!(LETTER_SEMITONES.len(), 26);
        assert_eq!(LETTER_NAMES.len(), 26);
        assert!(LETTER_SEMITONES.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(LETTER_NAMES[0], "B3");
        assert_eq!(LETTER_NAMES[25], "C6");
    }

    #[test]
    fn segments_for_ab_space_c() {
        let engine = MelodyEngine::new(&melody("AB C")).unwrap();
        let notes = engine.notes();
        assert_eq!(notes.len(), 4);
        let tones: Vec<(char, f64)> = notes
            .iter()
            .filter_map(|n| match n {
                Note::Tone { letter, frequency } => Some((*letter, *frequency)),
                Note::Rest => None,
            })
            .collect();
        assert_eq!(tones.len(), 3);
        assert_eq!(notes[2], Note::Rest);
        assert_eq!(tones[0], ('A', 247.0));
        assert!((tones[1].1 - 247.0 * halftones(1.0)).abs() < 1e-9);
        assert!((tones[2].1 - 247.0 * halftones(2.0)).abs() < 1e-9);

        assert_eq!(engine.segment_frames(), 400 + 5000 + 800);
        let frames: Vec<PcmFrame> = engine.collect();
        assert_eq!(frames.len(), 4 * 6200);

        // The rest is silent for exactly one segment
        let rest = &frames[2 * 6200..3 * 6200];
        assert!(rest.iter().all(|f| *f == PcmFrame::SILENCE));
        // Tones are audible and mono
        for segment in [0, 1, 3] {
            let tone = &frames[segment * 6200..(segment + 1) * 6200];
            assert!(tone.iter().all(|f| f.left == f.right));
            assert!(tone.iter().any(|f| f.left.abs() > 7000));
            assert!(tone.iter().all(|f| f.left.abs() <= 8000));
        }
    }

    #[test]
    fn lowercase_is_folded() {
        let notes = parse_sentence("hi", 247.0).unwrap();
        assert!(matches!(notes[0], Note::Tone { letter: 'H', .. }));
        assert!(matches!(notes[1], Note::Tone { letter: 'I', .. }));
    }

    #[test]
    fn unknown_character_is_fatal() {
        let err = parse_sentence("HI, YOU", 247.0).unwrap_err();
        assert_eq!(err.ch, ',');
        assert_eq!(err.index, 2);
        assert_eq!(err.span, 2..3);

        let result = MelodyEngine::new(&melody("ÄB"));
        match result {
            Err(ToneError::Melody(e)) => {
                assert_eq!(e.index, 0);
                assert_eq!(e.span, 0..2);
            }
            other => panic!("Expected melody error, got {other:?}"),
        }
    }

    #[test]
    fn default_sentence_renders() {
        let engine = MelodyEngine::new(&MelodyConfig::default()).unwrap();
        let expected = engine.total_frames();
        assert_eq!(expected, 52 * 6200);
        assert_eq!(engine.count() as u64, expected);
    }

    #[test]
    fn empty_sentence_is_silent_stream() {
        assert_eq!(MelodyEngine::new(&melody("")).unwrap().count(), 0);
    }
}
