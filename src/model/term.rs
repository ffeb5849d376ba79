use std::fmt;

use serde::{Deserialize, Serialize};

/// The supported fixed mortgage terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MortgageTerm {
    TenYear,
    FifteenYear,
    TwentyYear,
    ThirtyYear,
}

impl MortgageTerm {
    pub const ALL: [MortgageTerm; 4] = [
        MortgageTerm::TenYear,
        MortgageTerm::FifteenYear,
        MortgageTerm::TwentyYear,
        MortgageTerm::ThirtyYear,
    ];

    pub fn years(self) -> u32 {
        match self {
            MortgageTerm::TenYear => 10,
            MortgageTerm::FifteenYear => 15,
            MortgageTerm::TwentyYear => 20,
            MortgageTerm::ThirtyYear => 30,
        }
    }

    pub fn from_years(years: u32) -> Option<Self> {
        match years {
            10 => Some(MortgageTerm::TenYear),
            15 => Some(MortgageTerm::FifteenYear),
            20 => Some(MortgageTerm::TwentyYear),
            30 => Some(MortgageTerm::ThirtyYear),
            _ => None,
        }
    }
}

impl fmt::Display for MortgageTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Year Fixed", self.years())
    }
}
