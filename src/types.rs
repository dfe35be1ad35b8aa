//! Type-safe values parsed from user input
//!
//! Free-text CLI arguments are turned into these types once, so the rest of
//! the crate never handles raw amount or host strings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::{DoserError, Result};

/// Default doser address on the local network
pub const DEFAULT_HOST: &str = "http://nutrient-doser.lan";

/// Millilitres in one US gallon, as the doser firmware counts them
pub const ML_PER_GALLON: f64 = 3785.41;

/// `<number><optional whitespace><unit>` anchored at the start of the input.
/// Anything after the unit token is ignored.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?)\s*(ml|l|gal)").expect("amount pattern is valid")
});

/// Volume unit of the target solution.
///
/// Parsing is case-insensitive; display and the wire form are fixed
/// (`Ml`, `L`, `Gal`), which is what the doser's `/dose` endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[derive(Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum VolumeUnit {
    #[strum(serialize = "ml", to_string = "Ml")]
    Ml,
    #[strum(serialize = "l", to_string = "L")]
    L,
    #[strum(serialize = "gal", to_string = "Gal")]
    Gal,
}

impl VolumeUnit {
    /// Millilitres per one of this unit
    pub fn scale_to_ml(&self) -> f64 {
        match self {
            Self::Ml => 1.0,
            Self::L => 1000.0,
            Self::Gal => ML_PER_GALLON,
        }
    }
}

/// Target volume of solution to mix, e.g. `2.5 L`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetAmount {
    pub value: f64,
    pub unit: VolumeUnit,
}

impl TargetAmount {
    pub fn in_ml(&self) -> f64 {
        self.value * self.unit.scale_to_ml()
    }

    pub fn in_gallons(&self) -> f64 {
        self.in_ml() / ML_PER_GALLON
    }
}

impl FromStr for TargetAmount {
    type Err = DoserError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = AMOUNT_PATTERN
            .captures(s)
            .ok_or_else(|| DoserError::invalid_amount(s))?;

        let value: f64 = caps[1]
            .parse()
            .map_err(|_| DoserError::invalid_amount(s))?;
        // A long enough digit run overflows to infinity
        if !value.is_finite() {
            return Err(DoserError::invalid_amount(s));
        }

        let unit = VolumeUnit::from_str(&caps[2]).map_err(|_| DoserError::invalid_amount(s))?;

        Ok(Self { value, unit })
    }
}

impl fmt::Display for TargetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Base URL of a doser, guaranteed to use http or https
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoserHost(String);

impl DoserHost {
    /// Full URL of an endpoint on this doser, e.g. `endpoint("dose")`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.0.trim_end_matches('/'), path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DoserHost {
    fn default() -> Self {
        Self(DEFAULT_HOST.to_string())
    }
}

impl FromStr for DoserHost {
    type Err = DoserError;

    fn from_str(s: &str) -> Result<Self> {
        // "device.lan" has no scheme at all
        if !s.contains(':') {
            return Err(DoserError::invalid_host_scheme(""));
        }

        let url = Url::parse(s).map_err(|e| DoserError::InvalidHost {
            url: s.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self(s.to_string())),
            other => Err(DoserError::invalid_host_scheme(other)),
        }
    }
}

impl fmt::Display for DoserHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> TargetAmount {
        s.parse().expect("amount should parse")
    }

    #[test]
    fn test_amount_examples() {
        assert_eq!(amount("500ml"), TargetAmount { value: 500.0, unit: VolumeUnit::Ml });
        assert_eq!(amount("2.5 L"), TargetAmount { value: 2.5, unit: VolumeUnit::L });
        assert_eq!(amount("1gal"), TargetAmount { value: 1.0, unit: VolumeUnit::Gal });
    }

    #[test]
    fn test_amount_without_leading_number_is_rejected() {
        for input in ["GAL5", "abc", "", " 5ml", "ml", ".5 gal", "5", "5 oz"] {
            let err = input.parse::<TargetAmount>().unwrap_err();
            assert!(
                matches!(err, DoserError::InvalidAmount(ref s) if s == input),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_amount_ignores_trailing_text() {
        assert_eq!(amount("5 gallons"), TargetAmount { value: 5.0, unit: VolumeUnit::Gal });
        assert_eq!(amount("3 liters"), TargetAmount { value: 3.0, unit: VolumeUnit::L });
    }

    #[test]
    fn test_amount_trailing_dot_is_not_a_fraction() {
        // "1." is not followed by digits, so the unit must come right after "1"
        assert!("1.gal".parse::<TargetAmount>().is_err());
    }

    #[test]
    fn test_unit_normalization() {
        for input in ["5ML", "5Ml", "5ml", "5mL"] {
            assert_eq!(amount(input).unit.to_string(), "Ml");
        }
        assert_eq!(amount("5l").unit.to_string(), "L");
        assert_eq!(amount("5GAL").unit.to_string(), "Gal");
    }

    #[test]
    fn test_unit_wire_form_matches_display() {
        for unit in [VolumeUnit::Ml, VolumeUnit::L, VolumeUnit::Gal] {
            let json = serde_json::to_string(&unit).unwrap();
            assert_eq!(json, format!("\"{unit}\""));
        }
    }

    #[test]
    fn test_overflowing_amount_is_rejected() {
        let huge = format!("{}ml", "9".repeat(400));
        assert!(huge.parse::<TargetAmount>().is_err());
    }

    #[test]
    fn test_amount_conversions() {
        let a = amount("2 gal");
        assert!((a.in_ml() - 7570.82).abs() < 1e-9);
        assert!((a.in_gallons() - 2.0).abs() < 1e-12);
        assert!((amount("1 L").in_ml() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_host_scheme_validation() {
        assert!(matches!(
            "ftp://device.lan".parse::<DoserHost>(),
            Err(DoserError::InvalidHostScheme(ref s)) if s == "ftp"
        ));
        assert!(matches!(
            "device.lan".parse::<DoserHost>(),
            Err(DoserError::InvalidHostScheme(ref s)) if s.is_empty()
        ));
        assert!("https://device.lan:8080".parse::<DoserHost>().is_ok());
        assert!("http://192.168.1.40".parse::<DoserHost>().is_ok());
    }

    #[test]
    fn test_host_endpoint() {
        assert_eq!(DoserHost::default().endpoint("dose"), "http://nutrient-doser.lan/dose");
        let host: DoserHost = "https://device.lan:8080/".parse().unwrap();
        assert_eq!(host.endpoint("dose"), "https://device.lan:8080/dose");
    }
}
