//! The symmetric one-week window of lead/lag shifts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shift applied to the forum columns relative to the market columns.
///
/// Lead shifts pair each price row with sentiment from earlier days; lag shifts
/// pair it with sentiment from later days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftLabel {
    #[serde(rename = "lag_3")]
    Lag3,
    #[serde(rename = "lag_2")]
    Lag2,
    #[serde(rename = "lag_1")]
    Lag1,
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "lead_1")]
    Lead1,
    #[serde(rename = "lead_2")]
    Lead2,
    #[serde(rename = "lead_3")]
    Lead3,
}

impl ShiftLabel {
    /// All seven shifts in profile order: lag_3 .. lag_1, 0, lead_1 .. lead_3.
    pub const ALL: [Self; 7] = [
        Self::Lag3,
        Self::Lag2,
        Self::Lag1,
        Self::Zero,
        Self::Lead1,
        Self::Lead2,
        Self::Lead3,
    ];

    pub const LAGS: [Self; 3] = [Self::Lag3, Self::Lag2, Self::Lag1];
    pub const LEADS: [Self; 3] = [Self::Lead1, Self::Lead2, Self::Lead3];

    /// Signed row offset: negative for leads, positive for lags.
    #[must_use]
    pub const fn offset(self) -> i32 {
        match self {
            Self::Lag3 => 3,
            Self::Lag2 => 2,
            Self::Lag1 => 1,
            Self::Zero => 0,
            Self::Lead1 => -1,
            Self::Lead2 => -2,
            Self::Lead3 => -3,
        }
    }

    /// Position of this shift in [`ShiftLabel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Lag3 => 0,
            Self::Lag2 => 1,
            Self::Lag1 => 2,
            Self::Zero => 3,
            Self::Lead1 => 4,
            Self::Lead2 => 5,
            Self::Lead3 => 6,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lag3 => "lag_3",
            Self::Lag2 => "lag_2",
            Self::Lag1 => "lag_1",
            Self::Zero => "0",
            Self::Lead1 => "lead_1",
            Self::Lead2 => "lead_2",
            Self::Lead3 => "lead_3",
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown shift label: '{s}'"))
    }
}
