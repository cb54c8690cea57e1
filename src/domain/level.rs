use std::{fmt, str::FromStr};

use borsh::BorshSerialize;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A difficulty or depth tier for an explanation.
///
/// Level 1 is written for patients with no background; level 5 is written
/// for specialists.
///
/// Levels serialize as `"level1"` .. `"level5"`. Bare numbers (`1`, `"1"`)
/// are accepted when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize)]
#[borsh(use_discriminant = true)]
pub enum ComplexityLevel {
    /// Plain language for patients and families.
    Level1 = 1,
    /// Informed patients and caregivers.
    Level2 = 2,
    /// Students and allied health.
    Level3 = 3,
    /// Clinicians.
    Level4 = 4,
    /// Specialists.
    Level5 = 5,
}

/// Error returned when a value is not a complexity level.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid complexity level '{0}': expected level1..level5")]
pub struct InvalidLevelError(String);

impl ComplexityLevel {
    /// All levels, from simplest to most advanced.
    pub const ALL: [Self; 5] = [
        Self::Level1,
        Self::Level2,
        Self::Level3,
        Self::Level4,
        Self::Level5,
    ];

    /// Returns the numeric tier (1-5).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Looks up a level by its numeric tier.
    #[must_use]
    pub const fn from_number(number: u64) -> Option<Self> {
        match number {
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            3 => Some(Self::Level3),
            4 => Some(Self::Level4),
            5 => Some(Self::Level5),
            _ => None,
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "level{}", self.number())
    }
}

impl FromStr for ComplexityLevel {
    type Err = InvalidLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("level").unwrap_or(s);
        digits
            .parse::<u64>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| InvalidLevelError(s.to_string()))
    }
}

impl Serialize for ComplexityLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComplexityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl de::Visitor<'_> for LevelVisitor {
            type Value = ComplexityLevel;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a complexity level (level1..level5 or 1..5)")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                ComplexityLevel::from_number(v)
                    .ok_or_else(|| E::custom(InvalidLevelError(v.to_string())))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(ComplexityLevel::from_number)
                    .ok_or_else(|| E::custom(InvalidLevelError(v.to_string())))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}
