//! Formatting Policy
//!
//! One place for every language- and unit-dependent string the dashboard
//! shows. Configured, not duplicated per view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::history::DisplayZone;
use crate::poller::FailureKind;

/// UI language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Th,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "th" | "thai" => Ok(Language::Th),
            other => Err(format!("Unknown language: {}. Use: en, th", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Th => write!(f, "th"),
        }
    }
}

/// Display unit. The feed reports Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Convert a feed value (Celsius) to this unit
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("Unknown unit: {}. Use: celsius, fahrenheit", other)),
        }
    }
}

/// Fixed strings for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub title: &'static str,
    pub current_caption: &'static str,
    pub loading: &'static str,
    pub fetch_failed: &'static str,
    pub no_data: &'static str,
    pub series: &'static str,
    pub nothing_to_export: &'static str,
    pub empty_export: &'static str,
}

const ENGLISH: Labels = Labels {
    title: "Temperature Dashboard",
    current_caption: "Current Temperature",
    loading: "Loading...",
    fetch_failed: "Failed to fetch data from Adafruit IO.",
    no_data: "No data found in the feed.",
    series: "Temperature",
    nothing_to_export: "No data available to download.",
    empty_export: "No readings in the selected time range.",
};

const THAI: Labels = Labels {
    title: "รายงานอุณหภูมิ",
    current_caption: "อุณหภูมิภายในถัง",
    loading: "กำลังโหลด...",
    fetch_failed: "ไม่สามารถดึงข้อมูลจาก Adafruit IO ได้",
    no_data: "ไม่พบข้อมูลในฟีด",
    series: "อุณหภูมิ",
    nothing_to_export: "ไม่มีข้อมูลให้ดาวน์โหลด",
    empty_export: "ไม่มีข้อมูลในช่วงเวลาที่เลือก",
};

/// Language, unit and zone for everything user-facing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatPolicy {
    pub language: Language,
    pub unit: TemperatureUnit,
    pub zone: DisplayZone,
}

impl FormatPolicy {
    pub fn new(language: Language, unit: TemperatureUnit, zone: DisplayZone) -> Self {
        Self {
            language,
            unit,
            zone,
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self.language {
            Language::En => &ENGLISH,
            Language::Th => &THAI,
        }
    }

    /// The single message shown for a failed poll
    pub fn failure_message(&self, kind: FailureKind) -> &'static str {
        match kind {
            FailureKind::EmptyFeed => self.labels().no_data,
            FailureKind::Network | FailureKind::Decode | FailureKind::Parse => {
                self.labels().fetch_failed
            }
        }
    }

    /// Feed value in the display unit, rounded to two decimals
    pub fn display_value(&self, celsius: f64) -> f64 {
        (self.unit.from_celsius(celsius) * 100.0).round() / 100.0
    }

    /// e.g. `23.40°C`
    pub fn format_value(&self, celsius: f64) -> String {
        format!("{:.2}{}", self.display_value(celsius), self.unit.symbol())
    }

    /// Chart series name, e.g. `Temperature (°C)`
    pub fn series_label(&self) -> String {
        format!("{} ({})", self.labels().series, self.unit.symbol())
    }

    /// Date and time of a reading, as shown on the chart axis
    pub fn chart_label(&self, timestamp: DateTime<Utc>) -> String {
        let fmt = match self.language {
            Language::En => "%-m/%-d/%Y %-I:%M:%S %p",
            Language::Th => "%-d/%-m/%Y %H:%M:%S",
        };
        self.zone.format(timestamp, fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy(language: Language, unit: TemperatureUnit) -> FormatPolicy {
        FormatPolicy::new(language, unit, DisplayZone::utc())
    }

    #[test]
    fn test_failure_messages() {
        let en = policy(Language::En, TemperatureUnit::Celsius);
        assert_eq!(en.failure_message(FailureKind::EmptyFeed), "No data found in the feed.");
        assert_eq!(
            en.failure_message(FailureKind::Network),
            "Failed to fetch data from Adafruit IO."
        );

        let th = policy(Language::Th, TemperatureUnit::Celsius);
        assert_eq!(th.failure_message(FailureKind::EmptyFeed), "ไม่พบข้อมูลในฟีด");
        assert_eq!(th.labels().title, "รายงานอุณหภูมิ");
    }

    #[test]
    fn test_value_rounding_and_units() {
        let c = policy(Language::En, TemperatureUnit::Celsius);
        assert_eq!(c.display_value(23.456), 23.46);
        assert_eq!(c.format_value(23.4), "23.40°C");

        let f = policy(Language::En, TemperatureUnit::Fahrenheit);
        assert_eq!(f.display_value(100.0), 212.0);
        assert_eq!(f.format_value(0.0), "32.00°F");
        assert_eq!(f.series_label(), "Temperature (°F)");
    }

    #[test]
    fn test_chart_labels() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 14, 5, 9).unwrap();

        assert_eq!(
            policy(Language::En, TemperatureUnit::Celsius).chart_label(ts),
            "1/1/2024 2:05:09 PM"
        );
        assert_eq!(
            policy(Language::Th, TemperatureUnit::Celsius).chart_label(ts),
            "1/1/2024 14:05:09"
        );
    }

    #[test]
    fn test_parse_language_and_unit() {
        assert_eq!("TH".parse::<Language>().unwrap(), Language::Th);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!("f".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
    }
}
