//! Engine parameters as supplied by the host, with validation

use serde::{Deserialize, Serialize};

use crate::drift::DriftSettings;
use crate::error::{LumenError, Result};
use crate::euclidean::RhythmPreset;
use crate::harmony::HarmonyParams;
use crate::sequencer::SequencerSettings;

/// Everything the host can tune
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub harmony: HarmonyParams,
    pub circle_of_fifths: DriftSettings,
    pub euclidean: SequencerSettings,
}

impl EngineParams {
    /// Check for inconsistent settings.
    ///
    /// The engine tolerates everything this rejects; validation exists so
    /// hosts can report bad input instead of silently getting a fallback.
    pub fn validate(&self) -> Result<()> {
        let h = &self.harmony;
        check_range("tension", h.tension, 0.0, 1.0)?;
        check_range("voicing_spread", h.voicing_spread, 0.0, 1.0)?;
        check_range("detune_cents", h.detune_cents, 0.0, 100.0)?;
        check_range("root_note", h.root_note as f64, 0.0, 11.0)?;

        let cof = &self.circle_of_fifths;
        if cof.enabled {
            if cof.drift_rate == 0 {
                return Err(LumenError::ZeroDriftRate);
            }
            if cof.range == 0 {
                return Err(LumenError::ZeroDriftRange);
            }
        }

        check_range("tempo", self.euclidean.tempo, 0.1, 8.0)?;
        for (lane, settings) in self.euclidean.lanes.iter().enumerate() {
            if settings.preset == RhythmPreset::Custom {
                if settings.steps == 0 {
                    return Err(LumenError::ZeroSteps(lane));
                }
                if settings.hits > settings.steps {
                    return Err(LumenError::HitsExceedSteps {
                        lane,
                        hits: settings.hits,
                        steps: settings.steps,
                    });
                }
            }
            if settings.note_min > settings.note_max {
                return Err(LumenError::InvalidNoteRange {
                    lane,
                    low: settings.note_min,
                    high: settings.note_max,
                });
            }
            check_range("level", settings.level, 0.0, 1.0)?;
        }

        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(LumenError::OutOfRange { name, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftDirection;
    use crate::harmony::ScaleMode;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EngineParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_hits_over_steps() {
        let mut params = EngineParams::default();
        params.euclidean.lanes[2].preset = RhythmPreset::Custom;
        params.euclidean.lanes[2].steps = 4;
        params.euclidean.lanes[2].hits = 5;
        assert_eq!(
            params.validate(),
            Err(LumenError::HitsExceedSteps { lane: 2, hits: 5, steps: 4 })
        );
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut params = EngineParams::default();
        params.harmony.tension = 1.5;
        assert!(matches!(
            params.validate(),
            Err(LumenError::OutOfRange { name: "tension", .. })
        ));

        let mut params = EngineParams::default();
        params.harmony.root_note = 12;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.euclidean.lanes[0].note_min = 80;
        params.euclidean.lanes[0].note_max = 70;
        assert!(matches!(
            params.validate(),
            Err(LumenError::InvalidNoteRange { lane: 0, .. })
        ));
    }

    #[test]
    fn test_drift_checked_only_when_enabled() {
        let mut params = EngineParams::default();
        params.circle_of_fifths.range = 0;
        assert!(params.validate().is_ok());
        params.circle_of_fifths.enabled = true;
        assert_eq!(params.validate(), Err(LumenError::ZeroDriftRange));
    }

    #[test]
    fn test_toml_with_defaults() {
        let params: EngineParams = toml::from_str(
            r#"
            [harmony]
            tension = 0.6
            scale_mode = "manual"
            manual_scale = "Lydian"
            root_note = 9

            [circle_of_fifths]
            enabled = true
            direction = "ccw"
            "#,
        )
        .unwrap();

        assert_eq!(params.harmony.tension, 0.6);
        assert_eq!(params.harmony.scale_mode, ScaleMode::Manual);
        assert_eq!(params.harmony.chord_rate_secs, 32.0);
        assert_eq!(params.circle_of_fifths.direction, DriftDirection::CounterClockwise);
        assert_eq!(params.circle_of_fifths.range, 3);
        assert_eq!(params.euclidean, SequencerSettings::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let mut params = EngineParams::default();
        params.euclidean.lanes[1].preset = RhythmPreset::Samba;
        let json = serde_json::to_string(&params).unwrap();
        let restored: EngineParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, restored);
    }
}
