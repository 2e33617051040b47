//! Forecast horizon and zoom selectors and their numeric meaning.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// How far past "now" recurring rules are expanded.
pub enum HorizonChoice {
    #[serde(rename = "3 Months")]
    ThreeMonths,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[default]
    #[serde(rename = "1 Year")]
    OneYear,
    #[serde(rename = "2 Years")]
    TwoYears,
    #[serde(rename = "5 Years")]
    FiveYears,
    #[serde(rename = "10 Years")]
    TenYears,
}

impl HorizonChoice {
    pub const ALL: [HorizonChoice; 6] = [
        HorizonChoice::ThreeMonths,
        HorizonChoice::SixMonths,
        HorizonChoice::OneYear,
        HorizonChoice::TwoYears,
        HorizonChoice::FiveYears,
        HorizonChoice::TenYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HorizonChoice::ThreeMonths => "3 Months",
            HorizonChoice::SixMonths => "6 Months",
            HorizonChoice::OneYear => "1 Year",
            HorizonChoice::TwoYears => "2 Years",
            HorizonChoice::FiveYears => "5 Years",
            HorizonChoice::TenYears => "10 Years",
        }
    }

    pub fn years(&self) -> f64 {
        match self {
            HorizonChoice::ThreeMonths => 0.25,
            HorizonChoice::SixMonths => 0.5,
            HorizonChoice::OneYear => 1.0,
            HorizonChoice::TwoYears => 2.0,
            HorizonChoice::FiveYears => 5.0,
            HorizonChoice::TenYears => 10.0,
        }
    }
}

impl fmt::Display for HorizonChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HorizonChoice {
    type Err = UnknownSelection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(value);
        HorizonChoice::ALL
            .into_iter()
            .find(|choice| normalize(choice.label()) == wanted)
            .ok_or_else(|| {
                let expected = HorizonChoice::ALL.iter().map(HorizonChoice::label).collect();
                UnknownSelection::new("horizon", value, expected)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Width of the visible window, in days, or the whole projection.
pub enum ZoomSpan {
    Days(f64),
    All,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Zoom presets offered to the presentation layer.
pub enum ZoomChoice {
    #[default]
    #[serde(rename = "1 Month")]
    OneMonth,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[serde(rename = "1 Year")]
    OneYear,
    #[serde(rename = "2 Years")]
    TwoYears,
    #[serde(rename = "All Time")]
    AllTime,
}

impl ZoomChoice {
    pub const ALL: [ZoomChoice; 5] = [
        ZoomChoice::OneMonth,
        ZoomChoice::SixMonths,
        ZoomChoice::OneYear,
        ZoomChoice::TwoYears,
        ZoomChoice::AllTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ZoomChoice::OneMonth => "1 Month",
            ZoomChoice::SixMonths => "6 Months",
            ZoomChoice::OneYear => "1 Year",
            ZoomChoice::TwoYears => "2 Years",
            ZoomChoice::AllTime => "All Time",
        }
    }

    pub fn span(&self) -> ZoomSpan {
        match self {
            ZoomChoice::OneMonth => ZoomSpan::Days(30.0),
            ZoomChoice::SixMonths => ZoomSpan::Days(180.0),
            ZoomChoice::OneYear => ZoomSpan::Days(365.0),
            ZoomChoice::TwoYears => ZoomSpan::Days(730.0),
            ZoomChoice::AllTime => ZoomSpan::All,
        }
    }
}

impl fmt::Display for ZoomChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ZoomChoice {
    type Err = UnknownSelection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(value);
        ZoomChoice::ALL
            .into_iter()
            .find(|choice| normalize(choice.label()) == wanted)
            .ok_or_else(|| {
                let expected = ZoomChoice::ALL.iter().map(ZoomChoice::label).collect();
                UnknownSelection::new("zoom", value, expected)
            })
    }
}

fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a selector label is not one of the offered presets.
pub struct UnknownSelection {
    pub kind: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

impl UnknownSelection {
    fn new(kind: &'static str, value: &str, expected: Vec<&'static str>) -> Self {
        Self {
            kind,
            value: value.trim().to_string(),
            expected,
        }
    }
}

impl fmt::Display for UnknownSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} `{}` (choose one of: {})",
            self.kind,
            self.value,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for UnknownSelection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_labels_map_to_fractional_years() {
        assert_eq!("3 Months".parse::<HorizonChoice>().unwrap().years(), 0.25);
        assert_eq!("6 months".parse::<HorizonChoice>().unwrap().years(), 0.5);
        assert_eq!("10  Years".parse::<HorizonChoice>().unwrap().years(), 10.0);
        assert!("3 Weeks".parse::<HorizonChoice>().is_err());
    }

    #[test]
    fn zoom_labels_map_to_spans() {
        assert_eq!(
            "1 Month".parse::<ZoomChoice>().unwrap().span(),
            ZoomSpan::Days(30.0)
        );
        assert_eq!(
            "2 years".parse::<ZoomChoice>().unwrap().span(),
            ZoomSpan::Days(730.0)
        );
        assert_eq!(
            "All Time".parse::<ZoomChoice>().unwrap().span(),
            ZoomSpan::All
        );
    }

    #[test]
    fn unknown_selection_lists_options() {
        let err = "forever".parse::<ZoomChoice>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("forever"));
        assert!(message.contains("All Time"));
    }

    #[test]
    fn choices_serialize_as_labels() {
        let json = serde_json::to_string(&HorizonChoice::FiveYears).unwrap();
        assert_eq!(json, "\"5 Years\"");
        let zoom: ZoomChoice = serde_json::from_str("\"All Time\"").unwrap();
        assert_eq!(zoom, ZoomChoice::AllTime);
    }
}
