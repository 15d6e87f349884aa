use serde::{Deserialize, Serialize};

/// Legal rule governing how subsidized-work months convert into
/// eligibility credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsidyRule {
    /// No subsidy discount applies; subsidized wages count in full.
    Full,
    /// Subsidized work earns no eligibility at all, it only extends the
    /// lookback window.
    NoAccrual,
    /// Subsidized months are credited at 75%. When an employment start
    /// date scopes them, conversion happens on the aggregate sum, not per
    /// month.
    Percent75,
    /// The first 10 chronological subsidized months from the employment
    /// start earn nothing; from the 11th onward the aggregate is credited
    /// at 75%.
    LockoutThenPercent75,
}

impl SubsidyRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::NoAccrual => "no-accrual",
            Self::Percent75 => "percent-75",
            Self::LockoutThenPercent75 => "lockout-then-75",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "no-accrual" => Some(Self::NoAccrual),
            "percent-75" => Some(Self::Percent75),
            "lockout-then-75" => Some(Self::LockoutThenPercent75),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_codes_round_trip() {
        for rule in [
            SubsidyRule::Full,
            SubsidyRule::NoAccrual,
            SubsidyRule::Percent75,
            SubsidyRule::LockoutThenPercent75,
        ] {
            assert_eq!(SubsidyRule::parse(rule.as_str()), Some(rule));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(SubsidyRule::parse("75"), None);
    }
}
