//! Scale catalog and tension-weighted scale selection

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LumenError;
use crate::rng::RandomSource;

/// Tension band a scale belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensionBand {
    Consonant,
    Color,
    High,
}

impl TensionBand {
    /// Bands eligible for a tension target
    pub fn allowed_for(target: f64) -> &'static [TensionBand] {
        if target <= 0.25 {
            &[Self::Consonant]
        } else if target <= 0.55 {
            &[Self::Consonant, Self::Color]
        } else if target <= 0.8 {
            &[Self::Color, Self::High]
        } else {
            &[Self::High]
        }
    }
}

/// Scale families in catalog order (ascending tension)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleFamily {
    Major,
    MajorPentatonic,
    Lydian,
    Mixolydian,
    MinorPentatonic,
    Dorian,
    Aeolian,
    HarmonicMinor,
    MelodicMinor,
    Octatonic,
    PhrygianDominant,
}

impl ScaleFamily {
    pub const CATALOG: [ScaleFamily; 11] = [
        Self::Major,
        Self::MajorPentatonic,
        Self::Lydian,
        Self::Mixolydian,
        Self::MinorPentatonic,
        Self::Dorian,
        Self::Aeolian,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::Octatonic,
        Self::PhrygianDominant,
    ];

    /// Get scale intervals (semitones from root)
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::MajorPentatonic => &[0, 2, 4, 7, 9],
            Self::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Self::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Self::MinorPentatonic => &[0, 3, 5, 7, 10],
            Self::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Self::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            Self::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Self::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Self::Octatonic => &[0, 1, 3, 4, 6, 7, 9, 10],
            Self::PhrygianDominant => &[0, 1, 4, 5, 7, 8, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::MajorPentatonic => "Major Pentatonic",
            Self::Lydian => "Lydian",
            Self::Mixolydian => "Mixolydian",
            Self::MinorPentatonic => "Minor Pentatonic",
            Self::Dorian => "Dorian",
            Self::Aeolian => "Aeolian",
            Self::HarmonicMinor => "Harmonic Minor",
            Self::MelodicMinor => "Melodic Minor",
            Self::Octatonic => "Octatonic",
            Self::PhrygianDominant => "Phrygian Dominant",
        }
    }

    pub fn tension(&self) -> f64 {
        match self {
            Self::Major => 0.0,
            Self::MajorPentatonic => 0.03,
            Self::Lydian => 0.10,
            Self::Mixolydian => 0.18,
            Self::MinorPentatonic => 0.22,
            Self::Dorian => 0.25,
            Self::Aeolian => 0.35,
            Self::HarmonicMinor => 0.50,
            Self::MelodicMinor => 0.55,
            Self::Octatonic => 0.85,
            Self::PhrygianDominant => 0.90,
        }
    }

    pub fn band(&self) -> TensionBand {
        match self {
            Self::Major
            | Self::MajorPentatonic
            | Self::Lydian
            | Self::Mixolydian
            | Self::MinorPentatonic
            | Self::Dorian => TensionBand::Consonant,
            Self::Aeolian | Self::HarmonicMinor | Self::MelodicMinor => TensionBand::Color,
            Self::Octatonic | Self::PhrygianDominant => TensionBand::High,
        }
    }

    pub fn contains_interval(&self, interval: u8) -> bool {
        self.intervals().contains(&interval)
    }

    /// Look up a scale by display name, ignoring case, spaces, `-` and `_`
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        Self::CATALOG.into_iter().find(|s| normalize(s.name()) == wanted)
    }

    /// In-scale MIDI notes in `low..=high` for the given root pitch class
    pub fn notes_in_range(&self, root: u8, low: u8, high: u8) -> Vec<u8> {
        let root = (root % 12) as u16;
        (low..=high)
            .filter(|&n| self.contains_interval(((n as u16 + 12 - root) % 12) as u8))
            .collect()
    }
}

impl FromStr for ScaleFamily {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| LumenError::UnknownScale(s.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Candidate scales for a tension target, in catalog order
pub fn candidates_for(target: f64) -> Vec<ScaleFamily> {
    let bands = TensionBand::allowed_for(target);
    ScaleFamily::CATALOG
        .into_iter()
        .filter(|s| bands.contains(&s.band()))
        .collect()
}

/// Proximity weight: `1 / (|tension - target| + 0.05)^1.5`
pub fn selection_weight(scale: ScaleFamily, target: f64) -> f64 {
    1.0 / ((scale.tension() - target).abs() + 0.05).powf(1.5)
}

/// Weighted random scale choice for a tension target in [0, 1].
///
/// One draw is consumed. When rounding leaves the cumulative walk short of
/// zero, the last candidate is returned.
pub fn select_scale(tension: f64, rng: &mut impl RandomSource) -> ScaleFamily {
    let target = tension.clamp(0.0, 1.0);
    let candidates = candidates_for(target);
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&s| selection_weight(s, target))
        .collect();
    let total: f64 = weights.iter().sum();

    let mut remaining = rng.next_f64() * total;
    for (&scale, &weight) in candidates.iter().zip(&weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return scale;
        }
    }

    // Every band holds at least one scale
    candidates[candidates.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_well_formed() {
        for scale in ScaleFamily::CATALOG {
            let iv = scale.intervals();
            assert_eq!(iv[0], 0, "{} must include the root", scale.name());
            assert!(iv.windows(2).all(|w| w[0] < w[1]));
            assert!(iv.iter().all(|&i| i < 12));
            assert!((0.0..=1.0).contains(&scale.tension()));
        }
        assert!(
            ScaleFamily::CATALOG
                .windows(2)
                .all(|w| w[0].tension() <= w[1].tension())
        );
    }

    #[test]
    fn test_band_filter() {
        assert!(candidates_for(0.1).iter().all(|s| s.band() == TensionBand::Consonant));
        assert_eq!(candidates_for(0.3).len(), 9);
        assert!(!candidates_for(0.7).contains(&ScaleFamily::Major));
        assert_eq!(
            candidates_for(0.95),
            vec![ScaleFamily::Octatonic, ScaleFamily::PhrygianDominant]
        );
    }

    #[test]
    fn test_exact_match_has_max_weight() {
        for scale in ScaleFamily::CATALOG {
            let target = scale.tension();
            let own = selection_weight(scale, target);
            for other in candidates_for(target) {
                assert!(own >= selection_weight(other, target));
            }
        }
    }

    #[test]
    fn test_selection_walk() {
        // First draw lands in the first candidate, last in the last
        let mut low = || 0.0;
        assert_eq!(select_scale(0.1, &mut low), ScaleFamily::Major);
        let mut high = || 0.999_999;
        assert_eq!(select_scale(0.9, &mut high), ScaleFamily::PhrygianDominant);
    }

    #[test]
    fn test_selection_is_reproducible() {
        for draw in [0.05, 0.33, 0.5, 0.81] {
            let a = select_scale(0.42, &mut || draw);
            let b = select_scale(0.42, &mut || draw);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_rounding_fallback_returns_last() {
        // A draw scaled past the total can never bring the walk to zero
        let mut over = || 1.5;
        assert_eq!(select_scale(0.3, &mut over), ScaleFamily::MelodicMinor);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ScaleFamily::from_name("harmonic minor"), Some(ScaleFamily::HarmonicMinor));
        assert_eq!(
            ScaleFamily::from_name("Phrygian_Dominant"),
            Some(ScaleFamily::PhrygianDominant)
        );
        assert_eq!("Dorian".parse::<ScaleFamily>(), Ok(ScaleFamily::Dorian));
        assert!("Bebop".parse::<ScaleFamily>().is_err());
    }

    #[test]
    fn test_notes_in_range() {
        // E minor pentatonic: E G A B D
        let notes = ScaleFamily::MinorPentatonic.notes_in_range(4, 60, 72);
        assert_eq!(notes, vec![62, 64, 67, 69, 71]);
    }
}
