//! Session driver combining key drift, harmony and the rhythm sequencer
//!
//! The engine is the single writer. After every transition it publishes a
//! fresh [`EngineSnapshot`] behind an `Arc`; readers on other threads keep
//! whichever snapshot they cloned and never observe a half-applied update.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::drift::CircleOfFifthsConfig;
use crate::harmony::{HarmonyState, create_harmony_state, phrase_seed, update_harmony_state};
use crate::params::EngineParams;
use crate::phrase::phrase_index;
use crate::rng::{SeededRandom, SeededRng};
use crate::sequencer::{EuclideanSequencer, LaneHit};

/// Read-only view of the engine after a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub phrase_index: i64,
    pub harmony: HarmonyState,
    pub drift_enabled: bool,
    pub drift_step: i32,
    pub home_root: u8,
    pub effective_root: u8,
}

/// Phrase-synchronized generative engine
pub struct Engine<R: SeededRandom = SeededRng> {
    seed_material: String,
    params: EngineParams,
    drift: CircleOfFifthsConfig,
    harmony: HarmonyState,
    sequencer: EuclideanSequencer,
    scale_notes: Vec<u8>,
    rhythm_rng: R,
    snapshot: Arc<EngineSnapshot>,
}

impl<R: SeededRandom> Engine<R> {
    pub fn new(seed_material: impl Into<String>, now: f64, params: EngineParams) -> Self {
        let seed_material = seed_material.into();
        let drift = CircleOfFifthsConfig::new(&params.circle_of_fifths);
        let root = drift.effective_root(params.harmony.root_note);
        let harmony = create_harmony_state::<R>(&seed_material, now, &params.harmony, root);
        let scale_notes = harmony.scale_notes();
        let rhythm_rng = R::from_seed(&rhythm_seed(&seed_material, harmony.phrase_index));
        let sequencer = EuclideanSequencer::new(&params.euclidean);

        info!(
            seed = %seed_material,
            phrase = harmony.phrase_index,
            scale = harmony.scale.name(),
            root,
            "Engine started"
        );

        let snapshot = Arc::new(make_snapshot(&harmony, &drift, &params));
        Self {
            seed_material,
            params,
            drift,
            harmony,
            sequencer,
            scale_notes,
            rhythm_rng,
            snapshot,
        }
    }

    pub fn seed_material(&self) -> &str {
        &self.seed_material
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn harmony(&self) -> &HarmonyState {
        &self.harmony
    }

    pub fn drift(&self) -> &CircleOfFifthsConfig {
        &self.drift
    }

    pub fn sequencer(&self) -> &EuclideanSequencer {
        &self.sequencer
    }

    /// Root currently in effect after drift
    pub fn effective_root(&self) -> u8 {
        self.drift.effective_root(self.params.harmony.root_note)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Replace the parameters.
    ///
    /// Drift position and lane cursors are kept; harmony changes are heard at
    /// the next chord change.
    pub fn set_params(&mut self, params: EngineParams) -> Arc<EngineSnapshot> {
        self.drift = self.drift.apply_settings(&params.circle_of_fifths);
        self.sequencer.configure(&params.euclidean);
        self.params = params;
        self.publish()
    }

    /// Advance drift and harmony for the phrase boundary at `now`.
    ///
    /// At most one update runs per phrase index; a call for a phrase that was
    /// already processed returns the current snapshot unchanged.
    pub fn on_phrase_boundary(&mut self, now: f64) -> Arc<EngineSnapshot> {
        let index = phrase_index(now);
        if index <= self.harmony.phrase_index {
            warn!(
                phrase = index,
                current = self.harmony.phrase_index,
                "Ignoring phrase boundary that was already processed"
            );
            return self.snapshot();
        }

        let drift_seed = format!("{}|drift", phrase_seed(&self.seed_material, index));
        let mut drift_rng = R::from_seed(&drift_seed);
        let update = self.drift.update(&mut drift_rng);
        if update.drifted {
            debug!(phrase = index, step = update.config.current_step, "key drift");
        }
        self.drift = update.config;

        let root = self.effective_root();
        self.harmony = update_harmony_state::<R>(
            &self.harmony,
            &self.seed_material,
            now,
            &self.params.harmony,
            root,
        );
        self.scale_notes = self.harmony.scale_notes();
        self.rhythm_rng = R::from_seed(&rhythm_seed(&self.seed_material, index));

        debug!(
            phrase = index,
            countdown = self.harmony.phrases_until_change,
            "phrase boundary"
        );
        self.publish()
    }

    /// One rhythmic tick across all lanes
    pub fn tick(&mut self) -> Vec<LaneHit> {
        self.sequencer.tick(&self.scale_notes, &mut self.rhythm_rng)
    }

    /// Rewind every lane cursor and the tick counter
    pub fn reset_rhythm(&mut self) {
        self.sequencer.reset();
    }

    /// Seconds between rhythmic ticks at the current tempo
    pub fn step_seconds(&self) -> f64 {
        self.sequencer.step_seconds()
    }

    fn publish(&mut self) -> Arc<EngineSnapshot> {
        self.snapshot = Arc::new(make_snapshot(&self.harmony, &self.drift, &self.params));
        self.snapshot()
    }
}

fn make_snapshot(
    harmony: &HarmonyState,
    drift: &CircleOfFifthsConfig,
    params: &EngineParams,
) -> EngineSnapshot {
    EngineSnapshot {
        phrase_index: harmony.phrase_index,
        harmony: harmony.clone(),
        drift_enabled: drift.enabled,
        drift_step: drift.current_step,
        home_root: params.harmony.root_note % 12,
        effective_root: drift.effective_root(params.harmony.root_note),
    }
}

fn rhythm_seed(seed_material: &str, index: i64) -> String {
    format!("{}|rhythm", phrase_seed(seed_material, index))
}
