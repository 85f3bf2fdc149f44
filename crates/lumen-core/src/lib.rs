//! lumen-core: deterministic harmony and rhythm engine for generative ambient music
//!
//! Given seed material, wall-clock time and a handful of musical parameters,
//! the engine decides the active scale, the sounding chord, the key drift
//! along the circle of fifths and which Euclidean steps fire. Every decision
//! is drawn from an injected random source, so hosts sharing a seed stay in
//! lock-step.

pub mod chord;
pub mod drift;
pub mod engine;
mod error;
pub mod euclidean;
pub mod harmony;
pub mod params;
pub mod phrase;
pub mod rng;
pub mod scale;
pub mod sequencer;

pub use chord::{ChordGenerator, ChordVoicing, VOICE_COUNT, midi_to_freq};
pub use drift::{
    CIRCLE_OF_FIFTHS, CircleOfFifthsConfig, DriftDirection, DriftSettings, DriftUpdate,
    drifted_root,
};
pub use engine::{Engine, EngineSnapshot};
pub use error::{LumenError, Result};
pub use euclidean::{RhythmPattern, RhythmPreset, euclidean_rhythm};
pub use harmony::{
    HarmonyParams, HarmonyState, ScaleMode, create_harmony_state, phrase_seed,
    update_harmony_state,
};
pub use params::EngineParams;
pub use phrase::{
    PHRASE_LENGTH, current_phrase_boundary, next_phrase_boundary, phrase_index,
    time_until_next_phrase,
};
pub use rng::{RandomSource, SeedWindow, SeededRandom, SeededRng};
pub use scale::{ScaleFamily, TensionBand, select_scale, selection_weight};
pub use sequencer::{EuclideanLane, EuclideanSequencer, LaneHit, LaneSettings, SequencerSettings};
