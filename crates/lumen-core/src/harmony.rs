//! Phrase-synchronized harmony: scale choice plus the sounding chord
//!
//! `create_harmony_state` and `update_harmony_state` are pure: the same
//! seed material, time and parameters always give the same state. Each
//! boundary update draws from a source keyed by `"<seed>|phrase:<index>"`,
//! so a late or repeated update for a phrase reproduces the same chord.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chord::{ChordGenerator, ChordVoicing};
use crate::phrase::{PHRASE_LENGTH, phrase_index};
use crate::rng::{RandomSource, SeededRandom};
use crate::scale::{ScaleFamily, select_scale};

/// How the active scale is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Auto,
    Manual,
}

/// Harmony parameters supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyParams {
    /// 0-1 dissonance dial
    pub tension: f64,
    /// Seconds between chord changes
    pub chord_rate_secs: f64,
    /// 0-1 octave displacement chance
    pub voicing_spread: f64,
    pub detune_cents: f64,
    pub scale_mode: ScaleMode,
    /// Scale name used in manual mode
    pub manual_scale: String,
    /// Home root pitch class (0 = C)
    pub root_note: u8,
}

impl Default for HarmonyParams {
    fn default() -> Self {
        Self {
            tension: 0.3,
            chord_rate_secs: 32.0,
            voicing_spread: 0.5,
            detune_cents: 8.0,
            scale_mode: ScaleMode::Auto,
            manual_scale: ScaleFamily::Dorian.name().to_string(),
            root_note: 4,
        }
    }
}

impl HarmonyParams {
    /// Phrases each chord is held for: `max(1, round(chord_rate / phrase))`
    pub fn phrases_per_chord(&self) -> u32 {
        (self.chord_rate_secs / PHRASE_LENGTH).round().max(1.0) as u32
    }

    pub fn chord_generator(&self, root: u8) -> ChordGenerator {
        ChordGenerator {
            root: root % 12,
            tension: self.tension,
            voicing_spread: self.voicing_spread,
            detune_cents: self.detune_cents,
        }
    }
}

/// Harmony in effect for the current phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyState {
    pub scale: ScaleFamily,
    /// Root pitch class the scale and chord were built on
    pub root: u8,
    pub chord: ChordVoicing,
    pub chord_pitch_classes: Vec<u8>,
    /// Phrase this state was last evaluated for
    pub phrase_index: i64,
    /// Time of the next phrase boundary, in seconds
    pub next_phrase_time: f64,
    /// Boundaries left before the chord is regenerated
    pub phrases_until_change: u32,
}

impl HarmonyState {
    /// Every MIDI note of the active scale on the current root
    pub fn scale_notes(&self) -> Vec<u8> {
        self.scale.notes_in_range(self.root, 0, 127)
    }
}

/// Seed string for a phrase
pub fn phrase_seed(seed_material: &str, index: i64) -> String {
    format!("{seed_material}|phrase:{index}")
}

/// Manual name when it resolves, automatic selection otherwise
pub fn resolve_scale(params: &HarmonyParams, rng: &mut impl RandomSource) -> ScaleFamily {
    match params.scale_mode {
        ScaleMode::Auto => select_scale(params.tension, rng),
        ScaleMode::Manual => match ScaleFamily::from_name(&params.manual_scale) {
            Some(scale) => scale,
            None => {
                warn!(
                    "Unknown scale {:?}, falling back to automatic selection",
                    params.manual_scale
                );
                select_scale(params.tension, rng)
            }
        },
    }
}

/// Initial harmony for a session starting at `now`
pub fn create_harmony_state<R: SeededRandom>(
    seed_material: &str,
    now: f64,
    params: &HarmonyParams,
    root: u8,
) -> HarmonyState {
    let mut rng = R::from_seed(seed_material);
    build_state(&mut rng, phrase_index(now), params, root)
}

/// Harmony after the phrase boundary at `now`.
///
/// The chord is rebuilt on `root` once the countdown has reached its floor;
/// otherwise only the countdown and boundary advance, so a key drift is
/// heard at the next chord change.
pub fn update_harmony_state<R: SeededRandom>(
    state: &HarmonyState,
    seed_material: &str,
    now: f64,
    params: &HarmonyParams,
    root: u8,
) -> HarmonyState {
    let index = phrase_index(now);
    let root = root % 12;

    if state.phrases_until_change <= 1 {
        let mut rng = R::from_seed(&phrase_seed(seed_material, index));
        let next = build_state(&mut rng, index, params, root);
        debug!(
            phrase = index,
            scale = next.scale.name(),
            root = next.root,
            notes = ?next.chord.midi_notes,
            "chord change"
        );
        return next;
    }

    HarmonyState {
        phrase_index: index,
        next_phrase_time: boundary_after(index),
        phrases_until_change: state.phrases_until_change - 1,
        ..state.clone()
    }
}

fn build_state(
    rng: &mut impl RandomSource,
    index: i64,
    params: &HarmonyParams,
    root: u8,
) -> HarmonyState {
    let scale = resolve_scale(params, rng);
    let chord = params.chord_generator(root).generate(scale, rng);
    HarmonyState {
        scale,
        root: root % 12,
        chord_pitch_classes: chord.pitch_classes(),
        chord,
        phrase_index: index,
        next_phrase_time: boundary_after(index),
        phrases_until_change: params.phrases_per_chord(),
    }
}

fn boundary_after(index: i64) -> f64 {
    (index + 1) as f64 * PHRASE_LENGTH
}
