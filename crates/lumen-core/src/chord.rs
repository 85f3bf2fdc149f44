//! Chord voicing generation

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;
use crate::scale::ScaleFamily;

/// Maximum simultaneous chord voices
pub const VOICE_COUNT: usize = 6;
/// Bass root for pitch class 0 (C2)
pub const BASS_ROOT: u8 = 36;
/// Window the chord pool is drawn from
pub const PLAYABLE_LOW: u8 = 36;
pub const PLAYABLE_HIGH: u8 = 84;
/// Octave displacement must land inside this range
pub const INSTRUMENT_LOW: u8 = 24;
pub const INSTRUMENT_HIGH: u8 = 96;

/// Equal-tempered frequency for a (possibly fractional) MIDI note
pub fn midi_to_freq(midi: f64) -> f64 {
    440.0 * 2f64.powf((midi - 69.0) / 12.0)
}

/// A realized chord: ascending MIDI notes and index-aligned frequencies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordVoicing {
    pub midi_notes: Vec<u8>,
    pub frequencies: Vec<f64>,
}

impl ChordVoicing {
    pub fn len(&self) -> usize {
        self.midi_notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midi_notes.is_empty()
    }

    pub fn lowest(&self) -> Option<u8> {
        self.midi_notes.first().copied()
    }

    /// Sorted, deduplicated pitch classes of the chord
    pub fn pitch_classes(&self) -> Vec<u8> {
        let mut pcs: Vec<u8> = self.midi_notes.iter().map(|n| n % 12).collect();
        pcs.sort_unstable();
        pcs.dedup();
        pcs
    }
}

/// Chord generator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordGenerator {
    /// Pitch class of the chord root (0 = C)
    pub root: u8,
    /// 0-1, below 0.5 gives 3-4 voices, otherwise 4-5
    pub tension: f64,
    /// 0-1, chance of moving each added voice an octave up or down
    pub voicing_spread: f64,
    /// Maximum per-voice detune in cents
    pub detune_cents: f64,
}

impl Default for ChordGenerator {
    fn default() -> Self {
        Self {
            root: 0,
            tension: 0.3,
            voicing_spread: 0.5,
            detune_cents: 0.0,
        }
    }
}

impl ChordGenerator {
    pub fn new(root: u8, tension: f64) -> Self {
        Self {
            root: root % 12,
            tension,
            ..Default::default()
        }
    }

    /// Build a voicing from `scale`.
    ///
    /// Draw order: chord size, root octave, pool shuffle, per-voice
    /// displacement, per-voice detune.
    pub fn generate(&self, scale: ScaleFamily, rng: &mut impl RandomSource) -> ChordVoicing {
        let root = self.root % 12;
        let base_root = BASS_ROOT + root;

        let extra = rng.pick_index(2);
        let size = if self.tension < 0.5 { 3 + extra } else { 4 + extra };

        let root_voice = if rng.chance(0.5) { base_root + 12 } else { base_root };
        let mut pool = pool_above(scale, root, root_voice);

        let mut notes = vec![root_voice];
        if scale.contains_interval(7) {
            notes.push(root_voice + 7);
        }
        pool.retain(|n| !notes.contains(n));
        shuffle(&mut pool, rng);

        for candidate in pool {
            if notes.len() >= size {
                break;
            }
            let mut note = candidate;
            if rng.chance(self.voicing_spread) {
                let shifted = if rng.chance(0.5) {
                    note as i16 + 12
                } else {
                    note as i16 - 12
                };
                let in_range =
                    (INSTRUMENT_LOW as i16..=INSTRUMENT_HIGH as i16).contains(&shifted);
                if in_range && shifted > root_voice as i16 && !notes.contains(&(shifted as u8)) {
                    note = shifted as u8;
                }
            }
            if !notes.contains(&note) {
                notes.push(note);
            }
        }

        notes.sort_unstable();
        notes.truncate(VOICE_COUNT);

        let frequencies = notes
            .iter()
            .map(|&n| {
                let cents = (rng.next_f64() * 2.0 - 1.0) * self.detune_cents;
                midi_to_freq(n as f64 + cents / 100.0)
            })
            .collect();

        ChordVoicing {
            midi_notes: notes,
            frequencies,
        }
    }
}

/// In-scale notes across 8 octaves that sit in the playable window above `floor`
fn pool_above(scale: ScaleFamily, root: u8, floor: u8) -> Vec<u8> {
    let mut pool = Vec::new();
    for octave in 0..8u16 {
        for &interval in scale.intervals() {
            let note = octave * 12 + root as u16 + interval as u16;
            if note > floor as u16 && (PLAYABLE_LOW as u16..=PLAYABLE_HIGH as u16).contains(&note) {
                pool.push(note as u8);
            }
        }
    }
    pool
}

/// Fisher-Yates driven by the injected source
fn shuffle<T>(items: &mut [T], rng: &mut impl RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.pick_index(i + 1);
        items.swap(i, j);
    }
}
