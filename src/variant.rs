//! The six published DROP variants for regression.
//!
//! Every variant is the same engine with three switches flipped:
//!
//! | Variant | Noise pre-filter | Ordering | Criterion |
//! |---|---|---|---|
//! | [`Variant::DropError`] | no | no | error |
//! | [`Variant::DropThreshold`] | no | no | threshold |
//! | [`Variant::Drop2Threshold`] | no | yes | threshold |
//! | [`Variant::Drop2Error`] | no | yes | error |
//! | [`Variant::Drop3Threshold`] | yes | yes | threshold |
//! | [`Variant::Drop3Error`] | yes | yes | error |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Removal criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// Count associates predicted within θ with and without the candidate.
    Threshold,
    /// Compare summed local-model error with and without the candidate.
    Error,
}

/// Switches that make up a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSpec {
    pub noise_filter: bool,
    pub ordered: bool,
    pub criterion: Criterion,
}

/// A named DROP variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Tag 0, the classic filter's default.
    #[default]
    DropError,
    DropThreshold,
    Drop2Threshold,
    Drop2Error,
    Drop3Threshold,
    Drop3Error,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::DropError,
        Variant::DropThreshold,
        Variant::Drop2Threshold,
        Variant::Drop2Error,
        Variant::Drop3Threshold,
        Variant::Drop3Error,
    ];

    pub fn spec(self) -> VariantSpec {
        use Criterion::{Error, Threshold};
        let (noise_filter, ordered, criterion) = match self {
            Variant::DropError => (false, false, Error),
            Variant::DropThreshold => (false, false, Threshold),
            Variant::Drop2Threshold => (false, true, Threshold),
            Variant::Drop2Error => (false, true, Error),
            Variant::Drop3Threshold => (true, true, Threshold),
            Variant::Drop3Error => (true, true, Error),
        };
        VariantSpec {
            noise_filter,
            ordered,
            criterion,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::DropError => "drop-error",
            Variant::DropThreshold => "drop-threshold",
            Variant::Drop2Threshold => "drop2-threshold",
            Variant::Drop2Error => "drop2-error",
            Variant::Drop3Threshold => "drop3-threshold",
            Variant::Drop3Error => "drop3-error",
        }
    }

    /// Numeric type tags (`-T`) of the Weka filter options.
    ///
    /// Only four variants have a tag: 0, 2, 3 and 5.
    pub fn from_tag(tag: u32) -> Result<Self, ConfigError> {
        match tag {
            0 => Ok(Variant::DropError),
            2 => Ok(Variant::Drop2Threshold),
            3 => Ok(Variant::Drop3Threshold),
            5 => Ok(Variant::Drop3Error),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == norm)
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}
