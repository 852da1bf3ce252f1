//! Pure validation for incoming drafts.
//!
//! Every create/update payload implements [`Validate`]; services call
//! [`Validate::normalize`] then [`Validate::validate`] before anything touches
//! the store, so persistence never sees an invalid entity.

use std::fmt;

use serde::Serialize;

/// Whether a draft is being validated for insertion or as the merged result
/// of an update. Some rules (e.g. "trip must not start in the past") only
/// apply to new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All rule failures for one payload, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any failure was recorded against `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub trait Validate {
    /// Canonicalize fields in place (trim, upper-case codes, ...).
    fn normalize(&mut self) {}

    fn validate(&self, mode: Mode) -> Result<(), ValidationErrors>;
}

/// Accumulates rule failures so a caller sees every problem at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok`.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, message)
    }

    /// Character-count bounds. Empty values are left to [`Validator::required`].
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len == 0 {
            return self;
        }
        if len < min {
            self.check(false, field, &format!("must be at least {min} characters"));
        } else if len > max {
            self.check(false, field, &format!("cannot exceed {max} characters"));
        }
        self
    }

    /// Upper-case letters and digits only.
    pub fn code(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value, "code is required");
        self.length(field, value, 3, 20);
        self.check(
            value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            field,
            "must contain only uppercase letters and numbers",
        )
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(value.is_finite(), field, "must be a valid number");
        self.check(!value.is_finite() || value >= 0.0, field, "cannot be negative")
    }

    pub fn at_least(&mut self, field: &str, value: i32, min: i32) -> &mut Self {
        self.check(value >= min, field, &format!("must be at least {min}"))
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

/// Trim, then upper-case. Codes are stored and looked up in this form.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Minimal `local@domain.tld` shape check: no whitespace, one `@`, a dot in
/// the domain that is neither first nor last.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(idx) => idx > 0 && idx < domain.len() - 1,
        None => false,
    }
}

/// Serde helpers for numeric fields that clients historically sent as
/// strings (`"299.00"`, `"$1,299"`).
pub mod lenient {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Float(f64),
        Text(String),
    }

    fn parse_money(text: &str) -> Option<f64> {
        let cleaned: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        cleaned.parse().ok()
    }

    pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Float(v) => Ok(v),
            NumberOrString::Text(s) => {
                parse_money(&s).ok_or_else(|| de::Error::custom(format!("invalid price '{s}'")))
            }
        }
    }

    pub fn optional_price<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        price(deserializer).map(Some)
    }

    /// Accepts `7`, `"7"`, or `"7 days"`; leading integer wins. Fractional
    /// or out-of-range numbers are rejected.
    pub fn days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Float(v)
                if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) =>
            {
                Ok(v as i32)
            }
            NumberOrString::Float(v) => Err(de::Error::custom(format!("invalid length '{v}'"))),
            NumberOrString::Text(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits
                    .parse()
                    .map_err(|_| de::Error::custom(format!("invalid length '{s}'")))
            }
        }
    }

    pub fn optional_days<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        days(deserializer).map(Some)
    }

}
