use serde::{Deserialize, Serialize};

use super::term::MortgageTerm;

/// A snapshot of average annual rates, in percentage points, keyed the way
/// the rates feed names them. Supplied once at model construction and never
/// mutated; fetching and caching rates is the caller's concern.
///
/// Only the four fixed-term rates feed the computation graph; the FHA, VA and
/// ARM rates ride along so a full feed payload deserializes without loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub thirty_year_fha: f64,
    pub thirty_year_va: f64,
    pub ten_year_fix: f64,
    pub fifteen_year_fix: f64,
    pub thirty_year_fix: f64,
    pub five_one_arm: f64,
    pub seven_one_arm: f64,
    pub twenty_year_fix: f64,
}

impl RateTable {
    /// Annual percentage rate for a fixed term, in percentage points
    /// (e.g. `3.054` for 3.054%).
    pub fn fixed_rate(&self, term: MortgageTerm) -> f64 {
        match term {
            MortgageTerm::TenYear => self.ten_year_fix,
            MortgageTerm::FifteenYear => self.fifteen_year_fix,
            MortgageTerm::TwentyYear => self.twenty_year_fix,
            MortgageTerm::ThirtyYear => self.thirty_year_fix,
        }
    }

    /// The September 2021 survey snapshot used throughout the test suite.
    pub fn sample() -> Self {
        Self {
            thirty_year_fha: 2.873,
            thirty_year_va: 2.858,
            ten_year_fix: 2.068,
            fifteen_year_fix: 2.358,
            thirty_year_fix: 3.054,
            five_one_arm: 2.898,
            seven_one_arm: 2.972,
            twenty_year_fix: 2.756,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MortgageTerm::TenYear, 2.068)]
    #[case(MortgageTerm::FifteenYear, 2.358)]
    #[case(MortgageTerm::TwentyYear, 2.756)]
    #[case(MortgageTerm::ThirtyYear, 3.054)]
    fn test_fixed_rate_lookup(#[case] term: MortgageTerm, #[case] expected: f64) {
        assert_eq!(RateTable::sample().fixed_rate(term), expected);
    }

    #[test]
    fn test_deserializes_feed_payload() {
        let payload = r#"{
            "thirty_year_fha": 2.873,
            "thirty_year_va": 2.858,
            "ten_year_fix": 2.068,
            "fifteen_year_fix": 2.358,
            "thirty_year_fix": 3.054,
            "five_one_arm": 2.898,
            "seven_one_arm": 2.972,
            "twenty_year_fix": 2.756
        }"#;
        let table: RateTable = serde_json::from_str(payload).unwrap();
        assert_eq!(table, RateTable::sample());
    }
}
