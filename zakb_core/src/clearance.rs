//! The collection types ("clearances") the ZAKB calendar knows.

use std::{fmt, str::FromStr};

use bitmask_enum::bitmask;
use serde::{Deserialize, Serialize};

use crate::error::UnknownClearance;

#[bitmask]
#[bitmask_config(inverted_flags)]
pub enum ClearanceBitmask {
    Residual,
    Organic,
    Paper,
    Yellow,
}

/// A collection type, identified on the calendar page by a single letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Clearance {
    #[serde(rename = "R")]
    Residual,
    #[serde(rename = "B")]
    Organic,
    #[serde(rename = "P")]
    Paper,
    #[serde(rename = "G")]
    Yellow,
}

impl Clearance {
    pub const ALL: [Clearance; 4] = [
        Clearance::Residual,
        Clearance::Organic,
        Clearance::Paper,
        Clearance::Yellow,
    ];

    /// The label of the event markers on the calendar page.
    pub fn code(self) -> &'static str {
        match self {
            Clearance::Residual => "R",
            Clearance::Organic => "B",
            Clearance::Paper => "P",
            Clearance::Yellow => "G",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Clearance::Residual => "Restabfallbehälter",
            Clearance::Organic => "Bioabfallbehälter",
            Clearance::Paper => "Papierbehälter",
            Clearance::Yellow => "Gelber Sack",
        }
    }

    /// Path segment used by the calendar server.
    pub fn slug(self) -> &'static str {
        match self {
            Clearance::Residual => "residual",
            Clearance::Organic => "organic",
            Clearance::Paper => "paper",
            Clearance::Yellow => "yellow",
        }
    }

    pub fn bitmask(self) -> ClearanceBitmask {
        match self {
            Clearance::Residual => ClearanceBitmask::Residual,
            Clearance::Organic => ClearanceBitmask::Organic,
            Clearance::Paper => ClearanceBitmask::Paper,
            Clearance::Yellow => ClearanceBitmask::Yellow,
        }
    }

    /// All clearances not contained in `excluded`, in calendar order.
    pub fn included(excluded: ClearanceBitmask) -> impl Iterator<Item = Clearance> {
        Self::ALL
            .into_iter()
            .filter(move |clearance| !excluded.contains(clearance.bitmask()))
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Clearance {
    type Err = UnknownClearance;

    /// Codes are matched exactly, `r` is not `R`.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|clearance| clearance.code() == code)
            .ok_or_else(|| UnknownClearance(code.to_owned()))
    }
}
