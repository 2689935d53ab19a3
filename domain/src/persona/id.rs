//! PersonaId value object

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of voices in the chorus (Value Object)
///
/// Four main personas participate in the rotation. The Governor is a
/// distinguished summarizing role: it never joins the rotation and can
/// never be deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PersonaId {
    /// Rational, analytical
    Cyclo,
    /// Empathetic, warm
    Emo,
    /// Direct, instinctive
    Prim,
    /// Reflective, spiritual
    Spri,
    /// Summarizer of the other four; never part of the rotation
    Governor,
}

impl PersonaId {
    /// The four main personas, in canonical order
    pub const MAIN: [PersonaId; 4] = [
        PersonaId::Cyclo,
        PersonaId::Emo,
        PersonaId::Prim,
        PersonaId::Spri,
    ];

    /// Get the display name for this persona
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Cyclo => "Cyclo",
            PersonaId::Emo => "Emo",
            PersonaId::Prim => "Prim",
            PersonaId::Spri => "Spri",
            PersonaId::Governor => "Governor",
        }
    }

    /// Check if this is the Governor role
    pub fn is_governor(&self) -> bool {
        matches!(self, PersonaId::Governor)
    }

    /// Check if this is one of the four main personas
    pub fn is_main(&self) -> bool {
        !self.is_governor()
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PersonaId {
    type Err = DomainError;

    /// Case-insensitive parse of a persona name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyclo" => Ok(PersonaId::Cyclo),
            "emo" => Ok(PersonaId::Emo),
            "prim" => Ok(PersonaId::Prim),
            "spri" => Ok(PersonaId::Spri),
            "governor" => Ok(PersonaId::Governor),
            other => Err(DomainError::UnknownPersona(other.to_string())),
        }
    }
}

impl Serialize for PersonaId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PersonaId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Scan a message for explicit at-mentions of main personas.
///
/// Matches `@name` and `@[name]`, case-insensitive. The Governor cannot be
/// force-mentioned. Returned in canonical order, each persona at most once.
pub fn forced_mentions(text: &str) -> Vec<PersonaId> {
    let lower = text.to_lowercase();
    PersonaId::MAIN
        .iter()
        .copied()
        .filter(|p| {
            let name = p.as_str().to_lowercase();
            lower.contains(&format!("@{name}")) || lower.contains(&format!("@[{name}]"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("cyclo".parse::<PersonaId>().unwrap(), PersonaId::Cyclo);
        assert_eq!("EMO".parse::<PersonaId>().unwrap(), PersonaId::Emo);
        assert_eq!("Governor".parse::<PersonaId>().unwrap(), PersonaId::Governor);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "zylo".parse::<PersonaId>(),
            Err(DomainError::UnknownPersona(_))
        ));
    }

    #[test]
    fn test_mentions_plain_and_bracketed() {
        assert_eq!(
            forced_mentions("hey @cyclo and @[Spri], thoughts?"),
            vec![PersonaId::Cyclo, PersonaId::Spri]
        );
    }

    #[test]
    fn test_mentions_ignore_governor_and_plain_names() {
        assert!(forced_mentions("@governor please").is_empty());
        assert!(forced_mentions("cyclo without the at sign").is_empty());
    }

    #[test]
    fn test_mentions_dedupe() {
        assert_eq!(
            forced_mentions("@emo @EMO @[emo]"),
            vec![PersonaId::Emo]
        );
    }
}
