use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How technical the model's answer should be. Deserializes from any casing
/// of the level name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Professional,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Professional,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => {
                "Explain this in simple, easy-to-understand terms, suitable for beginners: "
            }
            DifficultyLevel::Medium => {
                "Provide a balanced explanation with moderate technical detail: "
            }
            DifficultyLevel::Professional => {
                "Give an in-depth, technical analysis with professional terminology and advanced concepts: "
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Medium => "Medium",
            DifficultyLevel::Professional => "Professional",
        }
    }

    /// Prefix and task joined by a single newline.
    pub fn compose_instruction(self, task_instruction: &str) -> String {
        format!("{}\n{}", self.prefix(), task_instruction)
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownDifficulty(wanted.to_string()))
    }
}

impl TryFrom<String> for DifficultyLevel {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_distinct() {
        let [easy, medium, professional] = DifficultyLevel::ALL.map(DifficultyLevel::prefix);
        assert_ne!(easy, medium);
        assert_ne!(medium, professional);
        assert_ne!(easy, professional);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("professional".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Professional));
        assert_eq!(" Easy ".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Easy));
        assert_eq!(
            "expert".parse::<DifficultyLevel>(),
            Err(ValidationError::UnknownDifficulty("expert".to_string()))
        );
    }

    #[test]
    fn deserializes_any_casing() {
        let level: DifficultyLevel = serde_json::from_str("\"EASY\"").unwrap();
        assert_eq!(level, DifficultyLevel::Easy);
        let err = serde_json::from_str::<DifficultyLevel>("\"Expert\"").unwrap_err();
        assert!(err.to_string().contains("Unknown difficulty level: Expert"));
    }

    #[test]
    fn medium_is_default() {
        assert_eq!(DifficultyLevel::default(), DifficultyLevel::Medium);
    }
}
