//! Volume scale selection.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplicative volume factor applied to the whole batch.
///
/// Only the nine steps offered in the UI exist; anything else is
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VolumeScale {
    #[default]
    Percent10,
    Percent20,
    Percent30,
    Percent40,
    Percent50,
    Percent60,
    Percent70,
    Percent80,
    Percent90,
}

/// Error returned when a value is not one of the nine volume steps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid volume '{0}': expected 10% to 90% in steps of 10")]
pub struct ParseVolumeError(pub String);

impl VolumeScale {
    /// All options in display order.
    pub const ALL: [VolumeScale; 9] = [
        VolumeScale::Percent10,
        VolumeScale::Percent20,
        VolumeScale::Percent30,
        VolumeScale::Percent40,
        VolumeScale::Percent50,
        VolumeScale::Percent60,
        VolumeScale::Percent70,
        VolumeScale::Percent80,
        VolumeScale::Percent90,
    ];

    /// Integer percentage (10..=90).
    pub fn percent(&self) -> u8 {
        match self {
            VolumeScale::Percent10 => 10,
            VolumeScale::Percent20 => 20,
            VolumeScale::Percent30 => 30,
            VolumeScale::Percent40 => 40,
            VolumeScale::Percent50 => 50,
            VolumeScale::Percent60 => 60,
            VolumeScale::Percent70 => 70,
            VolumeScale::Percent80 => 80,
            VolumeScale::Percent90 => 90,
        }
    }

    /// Amplitude factor (0.1..=0.9).
    pub fn factor(&self) -> f32 {
        self.percent() as f32 / 100.0
    }

    /// Look up the step for an integer percentage.
    pub fn from_percent(percent: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.percent() == percent)
    }
}

impl std::fmt::Display for VolumeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl FromStr for VolumeScale {
    type Err = ParseVolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::from_percent)
            .ok_or_else(|| ParseVolumeError(s.to_string()))
    }
}

impl TryFrom<u8> for VolumeScale {
    type Error = ParseVolumeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_percent(value).ok_or_else(|| ParseVolumeError(value.to_string()))
    }
}

impl From<VolumeScale> for u8 {
    fn from(value: VolumeScale) -> Self {
        value.percent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offers_nine_steps_of_ten() {
        let percents: Vec<u8> = VolumeScale::ALL.iter().map(|v| v.percent()).collect();
        assert_eq!(percents, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
    }

    #[test]
    fn default_is_first_entry() {
        assert_eq!(VolumeScale::default(), VolumeScale::Percent10);
    }

    #[test]
    fn displays_as_percentage() {
        assert_eq!(VolumeScale::Percent50.to_string(), "50%");
        assert_eq!(VolumeScale::Percent90.to_string(), "90%");
    }

    #[test]
    fn parses_with_and_without_suffix() {
        assert_eq!("20%".parse::<VolumeScale>(), Ok(VolumeScale::Percent20));
        assert_eq!(" 70 ".parse::<VolumeScale>(), Ok(VolumeScale::Percent70));
        assert!("15%".parse::<VolumeScale>().is_err());
        assert!("100%".parse::<VolumeScale>().is_err());
        assert!("loud".parse::<VolumeScale>().is_err());
    }

    #[test]
    fn factor_matches_percentage() {
        assert!((VolumeScale::Percent10.factor() - 0.1).abs() < 1e-6);
        assert!((VolumeScale::Percent50.factor() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range_percent() {
        assert_eq!(VolumeScale::from_percent(0), None);
        assert!(VolumeScale::try_from(55u8).is_err());
    }
}
