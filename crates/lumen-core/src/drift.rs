//! Circle-of-fifths key drift
//!
//! A bounded random walk of the key around a home root. The walk only moves
//! at phrase boundaries, and only every `drift_rate` phrases. A step that
//! would leave `[-range, +range]` bounces back toward home instead.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LumenError;
use crate::rng::RandomSource;

/// Pitch classes ordered by ascending fifths
pub const CIRCLE_OF_FIFTHS: [u8; 12] = [0, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriftDirection {
    #[serde(rename = "cw")]
    Clockwise,
    #[serde(rename = "ccw")]
    CounterClockwise,
    #[default]
    #[serde(rename = "random")]
    Random,
}

impl DriftDirection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clockwise => "cw",
            Self::CounterClockwise => "ccw",
            Self::Random => "random",
        }
    }
}

impl FromStr for DriftDirection {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Ok(Self::Clockwise),
            "ccw" | "counterclockwise" | "counter-clockwise" => Ok(Self::CounterClockwise),
            "random" => Ok(Self::Random),
            _ => Err(LumenError::UnknownDirection(s.to_string())),
        }
    }
}

/// User-facing drift settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftSettings {
    pub enabled: bool,
    /// Phrases between drift attempts (>= 1)
    pub drift_rate: u32,
    pub direction: DriftDirection,
    /// Maximum steps away from home (>= 1)
    pub range: u32,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            drift_rate: 2,
            direction: DriftDirection::Random,
            range: 3,
        }
    }
}

/// Drift settings plus the walk's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleOfFifthsConfig {
    pub enabled: bool,
    pub drift_rate: u32,
    pub direction: DriftDirection,
    pub range: u32,
    /// Signed offset from home, always within `[-range, +range]`
    pub current_step: i32,
    phrase_counter: u32,
}

impl Default for CircleOfFifthsConfig {
    fn default() -> Self {
        Self::new(&DriftSettings::default())
    }
}

/// Result of one boundary update
#[derive(Debug, Clone, PartialEq)]
pub struct DriftUpdate {
    pub config: CircleOfFifthsConfig,
    pub drifted: bool,
}

impl CircleOfFifthsConfig {
    pub fn new(settings: &DriftSettings) -> Self {
        Self {
            enabled: settings.enabled,
            drift_rate: settings.drift_rate.max(1),
            direction: settings.direction,
            range: settings.range,
            current_step: 0,
            phrase_counter: 0,
        }
    }

    pub fn phrase_counter(&self) -> u32 {
        self.phrase_counter
    }

    /// Take new settings, keeping the walk position (clamped into a shrunken range)
    pub fn apply_settings(&self, settings: &DriftSettings) -> Self {
        let range = settings.range as i32;
        Self {
            enabled: settings.enabled,
            drift_rate: settings.drift_rate.max(1),
            direction: settings.direction,
            range: settings.range,
            current_step: self.current_step.clamp(-range, range),
            phrase_counter: self.phrase_counter,
        }
    }

    /// Advance the walk by one phrase boundary
    pub fn update(&self, rng: &mut impl RandomSource) -> DriftUpdate {
        if !self.enabled {
            return DriftUpdate {
                config: Self {
                    current_step: 0,
                    ..self.clone()
                },
                drifted: false,
            };
        }

        let counter = self.phrase_counter + 1;
        if counter < self.drift_rate {
            return DriftUpdate {
                config: Self {
                    phrase_counter: counter,
                    ..self.clone()
                },
                drifted: false,
            };
        }

        let direction = match self.direction {
            DriftDirection::Clockwise => 1,
            DriftDirection::CounterClockwise => -1,
            DriftDirection::Random => {
                if rng.chance(0.5) {
                    1
                } else {
                    -1
                }
            }
        };

        let range = self.range as i32;
        let mut step = self.current_step + direction;
        if step.abs() > range {
            step = self.current_step - direction;
        }
        if step.abs() > range {
            step = self.current_step;
        }

        DriftUpdate {
            config: Self {
                current_step: step,
                phrase_counter: 0,
                ..self.clone()
            },
            drifted: step != self.current_step,
        }
    }

    /// Root currently in effect for a home root
    pub fn effective_root(&self, home_root: u8) -> u8 {
        if self.enabled {
            drifted_root(home_root, self.current_step)
        } else {
            home_root % 12
        }
    }
}

/// Move `home_root` by `step` positions around the circle of fifths
pub fn drifted_root(home_root: u8, step: i32) -> u8 {
    let home = home_root % 12;
    let position = CIRCLE_OF_FIFTHS
        .iter()
        .position(|&pc| pc == home)
        .unwrap_or(0) as i32;
    CIRCLE_OF_FIFTHS[(position + step).rem_euclid(12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn enabled(drift_rate: u32, direction: DriftDirection, range: u32) -> CircleOfFifthsConfig {
        CircleOfFifthsConfig::new(&DriftSettings {
            enabled: true,
            drift_rate,
            direction,
            range,
        })
    }

    #[test]
    fn test_zero_step_is_home() {
        for home in 0..12 {
            assert_eq!(drifted_root(home, 0), home);
        }
    }

    #[test]
    fn test_drifted_root_wraps() {
        assert_eq!(drifted_root(0, 1), 7); // C -> G
        assert_eq!(drifted_root(0, -1), 5); // C -> F
        assert_eq!(drifted_root(4, 2), 6); // E -> B -> F#
        assert_eq!(drifted_root(5, 1), 0); // F -> C
        assert_eq!(drifted_root(0, 12), 0);
        assert_eq!(drifted_root(0, -13), 5);
    }

    #[test]
    fn test_clockwise_bounce() {
        let mut config = enabled(1, DriftDirection::Clockwise, 2);
        let mut rng = || 0.5;
        let mut steps = Vec::new();
        for _ in 0..3 {
            config = config.update(&mut rng).config;
            steps.push(config.current_step);
        }
        assert_eq!(steps, vec![1, 2, 1]);
    }

    #[test]
    fn test_drift_rate_counts_phrases() {
        let mut config = enabled(3, DriftDirection::CounterClockwise, 4);
        let mut rng = || 0.5;
        let drifted: Vec<bool> = (0..6)
            .map(|_| {
                let update = config.update(&mut rng);
                config = update.config;
                update.drifted
            })
            .collect();
        assert_eq!(drifted, vec![false, false, true, false, false, true]);
        assert_eq!(config.current_step, -2);
    }

    #[test]
    fn test_zero_range_stays_home() {
        let config = enabled(1, DriftDirection::Random, 0);
        let update = config.update(&mut || 0.1);
        assert!(!update.drifted);
        assert_eq!(update.config.current_step, 0);
    }

    #[test]
    fn test_disabled_resets_step() {
        let mut config = enabled(1, DriftDirection::Clockwise, 3);
        config = config.update(&mut || 0.0).config;
        assert_eq!(config.current_step, 1);

        config.enabled = false;
        let update = config.update(&mut || 0.0);
        assert_eq!(update.config.current_step, 0);
        assert!(!update.drifted);
        assert_eq!(update.config.effective_root(9), 9);
    }

    #[test]
    fn test_random_walk_stays_in_range() {
        for range in 1..5 {
            let mut config = enabled(1, DriftDirection::Random, range);
            let mut rng = SeededRng::new(&format!("walk:{range}"));
            for _ in 0..500 {
                config = config.update(&mut rng).config;
                assert!(config.current_step.abs() <= range as i32);
            }
        }
    }

    #[test]
    fn test_apply_settings_clamps_step() {
        let mut config = enabled(1, DriftDirection::Clockwise, 4);
        for _ in 0..4 {
            config = config.update(&mut || 0.0).config;
        }
        assert_eq!(config.current_step, 4);
        let shrunk = config.apply_settings(&DriftSettings {
            enabled: true,
            drift_rate: 1,
            direction: DriftDirection::Clockwise,
            range: 2,
        });
        assert_eq!(shrunk.current_step, 2);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("cw".parse::<DriftDirection>(), Ok(DriftDirection::Clockwise));
        assert_eq!("CCW".parse::<DriftDirection>(), Ok(DriftDirection::CounterClockwise));
        assert!("sideways".parse::<DriftDirection>().is_err());
    }
}
