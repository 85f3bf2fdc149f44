//! Four-lane Euclidean sequencer

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::euclidean::{RhythmPattern, RhythmPreset};
use crate::phrase::PHRASE_LENGTH;
use crate::rng::RandomSource;

/// Number of lanes in a sequencer
pub const LANE_COUNT: usize = 4;
/// Rhythmic steps per phrase at tempo 1.0
pub const STEPS_PER_PHRASE: f64 = 64.0;

/// User-facing lane parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSettings {
    pub enabled: bool,
    /// Named pattern; `custom` uses `steps`/`hits`/`rotation`
    pub preset: RhythmPreset,
    pub steps: u32,
    pub hits: u32,
    pub rotation: u32,
    /// Lowest MIDI note the lane may play
    pub note_min: u8,
    /// Highest MIDI note the lane may play
    pub note_max: u8,
    /// Velocity 0-1 carried by every note the lane emits
    pub level: f64,
}

impl Default for LaneSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            preset: RhythmPreset::Custom,
            steps: 16,
            hits: 4,
            rotation: 0,
            note_min: 60,
            note_max: 72,
            level: 0.7,
        }
    }
}

impl LaneSettings {
    pub fn with_preset(preset: RhythmPreset, note_min: u8, note_max: u8, level: f64) -> Self {
        let mut settings = Self {
            preset,
            note_min,
            note_max,
            level,
            ..Default::default()
        };
        if let Some(p) = preset.pattern() {
            settings.steps = p.steps;
            settings.hits = p.hits;
            settings.rotation = p.rotation;
        }
        settings
    }

    /// Pattern the lane plays: the preset's, or the lane's own numbers for `custom`
    pub fn rhythm(&self) -> RhythmPattern {
        self.preset.pattern().unwrap_or(RhythmPattern::new(
            self.steps.max(1),
            self.hits.min(self.steps.max(1)),
            self.rotation,
        ))
    }
}

/// A note emitted by a lane on a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneHit {
    pub lane: usize,
    pub note: u8,
    pub level: f64,
}

/// One rhythmic voice: a generated pattern, a cursor and a note range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EuclideanLane {
    pub enabled: bool,
    pub preset: RhythmPreset,
    pub note_min: u8,
    pub note_max: u8,
    pub level: f64,
    rhythm: RhythmPattern,
    pattern: Vec<bool>,
    cursor: usize,
}

impl Default for EuclideanLane {
    fn default() -> Self {
        Self::new(&LaneSettings::default())
    }
}

impl EuclideanLane {
    pub fn new(settings: &LaneSettings) -> Self {
        let rhythm = settings.rhythm();
        Self {
            enabled: settings.enabled,
            preset: settings.preset,
            note_min: settings.note_min,
            note_max: settings.note_max,
            level: settings.level,
            rhythm,
            pattern: rhythm.generate(),
            cursor: 0,
        }
    }

    /// Apply new settings; the pattern is only rebuilt when its shape changes
    pub fn configure(&mut self, settings: &LaneSettings) {
        self.enabled = settings.enabled;
        self.preset = settings.preset;
        self.note_min = settings.note_min;
        self.note_max = settings.note_max;
        self.level = settings.level;
        self.set_rhythm(settings.rhythm());
    }

    pub fn set_steps(&mut self, steps: u32) {
        let steps = steps.max(1);
        self.preset = RhythmPreset::Custom;
        let hits = self.rhythm.hits.min(steps);
        self.set_rhythm(RhythmPattern::new(steps, hits, self.rhythm.rotation));
    }

    pub fn set_hits(&mut self, hits: u32) {
        self.preset = RhythmPreset::Custom;
        let steps = self.rhythm.steps;
        self.set_rhythm(RhythmPattern::new(steps, hits.min(steps), self.rhythm.rotation));
    }

    pub fn set_rotation(&mut self, rotation: u32) {
        self.preset = RhythmPreset::Custom;
        self.set_rhythm(RhythmPattern::new(self.rhythm.steps, self.rhythm.hits, rotation));
    }

    /// Switch to a named preset; `custom` keeps the current pattern
    pub fn set_preset(&mut self, preset: RhythmPreset) {
        self.preset = preset;
        if let Some(rhythm) = preset.pattern() {
            self.set_rhythm(rhythm);
        }
    }

    fn set_rhythm(&mut self, rhythm: RhythmPattern) {
        if rhythm == self.rhythm && self.pattern.len() == rhythm.steps as usize {
            return;
        }
        self.rhythm = rhythm;
        self.pattern = rhythm.generate();
        if self.pattern.is_empty() {
            self.cursor = 0;
        } else {
            self.cursor %= self.pattern.len();
        }
    }

    pub fn rhythm(&self) -> RhythmPattern {
        self.rhythm
    }

    pub fn pattern(&self) -> &[bool] {
        &self.pattern
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Read the step under the cursor and move on; `true` on a hit
    pub fn advance(&mut self) -> bool {
        if !self.enabled || self.pattern.is_empty() {
            return false;
        }
        let hit = self.pattern[self.cursor];
        self.cursor = (self.cursor + 1) % self.pattern.len();
        hit
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Pick a note from `scale_notes` within the lane's bounds, or the bounds' midpoint
    pub fn pick_note(&self, scale_notes: &[u8], rng: &mut impl RandomSource) -> u8 {
        let candidates: Vec<u8> = scale_notes
            .iter()
            .copied()
            .filter(|n| (self.note_min..=self.note_max).contains(n))
            .collect();
        if candidates.is_empty() {
            return ((self.note_min as u16 + self.note_max as u16) / 2) as u8;
        }
        candidates[rng.pick_index(candidates.len())]
    }
}

/// Sequencer-wide parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSettings {
    pub enabled: bool,
    /// Tick rate multiplier
    pub tempo: f64,
    pub lanes: [LaneSettings; LANE_COUNT],
}

impl Default for SequencerSettings {
    fn default() -> Self {
        let mut lead = LaneSettings::with_preset(RhythmPreset::Tresillo, 60, 72, 0.8);
        lead.enabled = true;
        Self {
            enabled: true,
            tempo: 1.0,
            lanes: [
                lead,
                LaneSettings::with_preset(RhythmPreset::Bossa, 67, 79, 0.6),
                LaneSettings::with_preset(RhythmPreset::Ruchenitza, 55, 67, 0.6),
                LaneSettings::with_preset(RhythmPreset::Sparse, 72, 84, 0.5),
            ],
        }
    }
}

/// Four lanes ticked together in fixed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EuclideanSequencer {
    pub lanes: [EuclideanLane; LANE_COUNT],
    pub enabled: bool,
    pub tempo: f64,
    tick_count: u64,
}

impl Default for EuclideanSequencer {
    fn default() -> Self {
        Self::new(&SequencerSettings::default())
    }
}

impl EuclideanSequencer {
    pub fn new(settings: &SequencerSettings) -> Self {
        Self {
            lanes: std::array::from_fn(|i| EuclideanLane::new(&settings.lanes[i])),
            enabled: settings.enabled,
            tempo: settings.tempo,
            tick_count: 0,
        }
    }

    pub fn configure(&mut self, settings: &SequencerSettings) {
        self.enabled = settings.enabled;
        self.tempo = settings.tempo;
        for (lane, lane_settings) in self.lanes.iter_mut().zip(&settings.lanes) {
            lane.configure(lane_settings);
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Seconds between ticks at the current tempo
    pub fn step_seconds(&self) -> f64 {
        PHRASE_LENGTH / STEPS_PER_PHRASE / self.tempo.max(0.01)
    }

    /// Advance every lane once and collect the notes of lanes that hit
    pub fn tick(&mut self, scale_notes: &[u8], rng: &mut impl RandomSource) -> Vec<LaneHit> {
        if !self.enabled {
            return Vec::new();
        }
        self.tick_count += 1;

        let mut hits = Vec::new();
        for (index, lane) in self.lanes.iter_mut().enumerate() {
            if !lane.advance() {
                continue;
            }
            let note = lane.pick_note(scale_notes, rng);
            trace!(lane = index, note, tick = self.tick_count, "lane hit");
            hits.push(LaneHit {
                lane: index,
                note,
                level: lane.level,
            });
        }
        hits
    }

    /// Rewind every lane and the tick counter
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
        self.tick_count = 0;
    }
}
