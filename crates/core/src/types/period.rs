//! Reporting periods for the dashboard and sales reports.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a period name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown period: {0}")]
pub struct PeriodError(pub String);

/// A reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    #[serde(alias = "all-time")]
    AllTime,
}

/// Display labels for a period's report and comparison windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLabels {
    pub title: &'static str,
    pub current_label: &'static str,
    pub previous_label: &'static str,
}

impl Period {
    /// All periods, in selector order.
    pub const ALL: [Self; 5] = [
        Self::Today,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::AllTime,
    ];

    /// Query-string name of the period.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::AllTime => "alltime",
        }
    }

    /// Report title and comparison labels.
    #[must_use]
    pub const fn labels(&self) -> PeriodLabels {
        let (title, current_label, previous_label) = match self {
            Self::Today => ("Daily Report", "Today", "Yesterday"),
            Self::Weekly => ("Weekly Report", "This Week", "Last Week"),
            Self::Monthly => ("Monthly Report", "This Month", "Last Month"),
            Self::Yearly => ("Yearly Report", "This Year", "Last Year"),
            Self::AllTime => ("All Time Report", "Total", "N/A"),
        };
        PeriodLabels {
            title,
            current_label,
            previous_label,
        }
    }

    /// Whether the period has a previous window to compare against.
    #[must_use]
    pub const fn has_comparison(&self) -> bool {
        !matches!(self, Self::AllTime)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" | "daily" => Ok(Self::Today),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            "alltime" | "all-time" | "all" => Ok(Self::AllTime),
            _ => Err(PeriodError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("today".parse::<Period>(), Ok(Period::Today));
        assert_eq!("Weekly".parse::<Period>(), Ok(Period::Weekly));
        assert_eq!("all-time".parse::<Period>(), Ok(Period::AllTime));
        assert_eq!("alltime".parse::<Period>(), Ok(Period::AllTime));
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_default_is_weekly() {
        assert_eq!(Period::default(), Period::Weekly);
    }

    #[test]
    fn test_labels() {
        let labels = Period::Monthly.labels();
        assert_eq!(labels.title, "Monthly Report");
        assert_eq!(labels.current_label, "This Month");
        assert_eq!(labels.previous_label, "Last Month");
        assert_eq!(Period::AllTime.labels().previous_label, "N/A");
    }

    #[test]
    fn test_as_str_parses_back() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>(), Ok(period));
        }
    }
}
