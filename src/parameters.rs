/*!

Scenario parameters.

[`Parameters`] collects every tunable the outbreak model reads: population
size, base seed, contact generation bounds, per-round rates and their
escalation, and the vaccination budget. [`Difficulty`] maps the three player
facing difficulty tags onto starting rates; everything else comes from
defaults or a JSON file.

*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OutbreakError;

/// Player-facing difficulty levels. Unrecognized tags fall back to `Normal`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Normal,
        }
    }

    /// Starting transmissibility for this difficulty.
    #[must_use]
    pub fn transmissibility(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.2,
            Difficulty::Hard => 1.8,
        }
    }

    /// Starting per-round fatality probability for this difficulty.
    #[must_use]
    pub fn fatality_probability(self) -> f64 {
        match self {
            Difficulty::Easy => 0.05,
            Difficulty::Normal => 0.1,
            Difficulty::Hard => 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Number of people in the scenario. Must be positive.
    pub population: usize,
    /// Base seed for all random streams; fixes the whole run.
    pub seed: u64,
    /// Expected infections per infected person per round, split across that
    /// person's contacts. May exceed 1.
    pub transmissibility: f64,
    /// Added to `transmissibility` after every completed round.
    pub transmissibility_growth: f64,
    /// Chance an infected person dies in a given round.
    pub fatality_probability: f64,
    /// Added to `fatality_probability` after every completed round.
    pub fatality_growth: f64,
    /// Vaccine doses available each round; unused doses do not carry over.
    pub vaccines_per_round: u32,
    /// Fewest contact proposals any person makes during network generation.
    pub min_contacts: usize,
    /// Most contact proposals any person makes during network generation.
    pub max_contacts: usize,
    /// People are placed uniformly in a ball of this radius for rendering.
    pub position_radius: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population: 60,
            seed: 0,
            transmissibility: Difficulty::Normal.transmissibility(),
            transmissibility_growth: 0.1,
            fatality_probability: Difficulty::Normal.fatality_probability(),
            fatality_growth: 0.05,
            vaccines_per_round: 3,
            min_contacts: 1,
            max_contacts: 3,
            position_radius: 100.0,
        }
    }
}

impl Parameters {
    /// Builds the standard scenario for `population` people at the difficulty
    /// named by `tag`, with every other tunable at its default.
    #[must_use]
    pub fn for_difficulty(population: usize, seed: u64, tag: &str) -> Self {
        let difficulty = Difficulty::from_tag(tag);
        Parameters {
            population,
            seed,
            transmissibility: difficulty.transmissibility(),
            fatality_probability: difficulty.fatality_probability(),
            ..Parameters::default()
        }
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OutbreakError> {
        let contents = std::fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        Ok(parameters)
    }

    /// Rejects settings the model cannot run with. Rates are unbounded above
    /// (a transmissibility over 1 is how late rounds guarantee spread) but
    /// must be finite and non-negative.
    pub fn validate(&self) -> Result<(), OutbreakError> {
        if self.population == 0 {
            return Err(OutbreakError::OutbreakError(String::from(
                "population must be greater than zero",
            )));
        }
        if self.min_contacts == 0 || self.min_contacts > self.max_contacts {
            return Err(OutbreakError::OutbreakError(format!(
                "contact range {}..={} is invalid; need 1 <= min <= max",
                self.min_contacts, self.max_contacts
            )));
        }
        for (name, value) in [
            ("transmissibility", self.transmissibility),
            ("transmissibility_growth", self.transmissibility_growth),
            ("fatality_probability", self.fatality_probability),
            ("fatality_growth", self.fatality_growth),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OutbreakError::OutbreakError(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.position_radius.is_finite() || self.position_radius <= 0.0 {
            return Err(OutbreakError::OutbreakError(format!(
                "position_radius must be finite and positive, got {}",
                self.position_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn difficulty_tags_are_case_insensitive_and_default_to_normal() {
        assert_eq!(Difficulty::from_tag("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_tag("Hard"), Difficulty::Hard);
        assert_eq!(Difficulty::from_tag("normal"), Difficulty::Normal);
        assert_eq!(Difficulty::from_tag("nightmare"), Difficulty::Normal);
        assert_eq!(Difficulty::from_tag(""), Difficulty::Normal);
    }

    #[test]
    fn difficulty_presets_scale_both_rates() {
        assert!(Difficulty::Easy.transmissibility() < Difficulty::Normal.transmissibility());
        assert!(Difficulty::Normal.transmissibility() < Difficulty::Hard.transmissibility());
        assert!(Difficulty::Easy.fatality_probability() < Difficulty::Hard.fatality_probability());
    }

    #[test]
    fn for_difficulty_fills_in_defaults() {
        let parameters = Parameters::for_difficulty(25, 99, "hard");
        assert_eq!(parameters.population, 25);
        assert_eq!(parameters.seed, 99);
        assert_eq!(parameters.transmissibility, Difficulty::Hard.transmissibility());
        assert_eq!(parameters.vaccines_per_round, 3);
        assert_eq!(parameters.min_contacts, 1);
        assert_eq!(parameters.max_contacts, 3);
    }

    #[test]
    fn validate_rejects_empty_population() {
        let parameters = Parameters {
            population: 0,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_contact_range() {
        let parameters = Parameters {
            min_contacts: 4,
            max_contacts: 2,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_rates() {
        let parameters = Parameters {
            transmissibility: f64::NAN,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());

        let parameters = Parameters {
            fatality_probability: -0.1,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn validate_accepts_transmissibility_above_one() {
        let parameters = Parameters {
            transmissibility: 5.0,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn from_file_applies_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"population": 12, "seed": 7}}"#).unwrap();

        let parameters = Parameters::from_file(file.path()).unwrap();
        assert_eq!(parameters.population, 12);
        assert_eq!(parameters.seed, 7);
        assert_eq!(parameters.vaccines_per_round, 3);
        assert_eq!(parameters.transmissibility, 1.2);
    }

    #[test]
    fn from_file_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Parameters::from_file(file.path()).is_err());
    }
}
