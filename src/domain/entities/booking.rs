use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::{
    entities::submission::{collapse_aliases, is_blank},
    errors::AppError,
};

pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s\-()+]+$").expect("phone pattern is valid"));

const MAX_SPECIAL_REQUEST_LENGTH: u64 = 2000;

/// Required booking fields, with the aliases accepted for each.
const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("fullName", &["full_name", "name"]),
    ("email", &[]),
    ("phone", &[]),
    ("checkIn", &["check_in"]),
    ("checkOut", &["check_out"]),
    ("adults", &[]),
    ("roomType", &["room_type"]),
];

const OPTIONAL_FIELDS: &[(&str, &[&str])] = &[("specialRequests", &["special_requests"])];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_stay"))]
pub struct BookingRequest {
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Phone number may only contain digits, spaces, hyphens, parentheses and +"
    ))]
    pub phone: String,

    #[validate(custom(function = "validate_stay_date"))]
    pub check_in: String,

    #[validate(custom(function = "validate_stay_date"))]
    pub check_out: String,

    #[serde(deserialize_with = "lenient_count")]
    #[validate(range(min = 1, message = "At least one adult is required"))]
    pub adults: u32,

    #[serde(default, deserialize_with = "lenient_count")]
    pub children: u32,

    #[validate(custom(function = "validate_room_type"))]
    pub room_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_SPECIAL_REQUEST_LENGTH, message = "Special requests are too long"))]
    pub special_requests: Option<String>,
}

impl BookingRequest {
    /// Collects every missing required field into one message.
    pub fn check_required(fields: &Map<String, Value>) -> Result<(), AppError> {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|(name, aliases)| {
                std::iter::once(name)
                    .chain(aliases.iter())
                    .all(|key| fields.get(*key).is_none_or(is_blank))
            })
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Typed view of a submitted form. Expects fields already stringified
    /// and stripped of blanks (`Submission::compact_fields`).
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, AppError> {
        let fields = collapse_aliases(&collapse_aliases(fields, REQUIRED_FIELDS), OPTIONAL_FIELDS);
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::Validation(format!("Invalid booking request: {}", e)))
    }

    /// Check-in and check-out dates, when both parse.
    pub fn stay_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((parse_stay_date(&self.check_in)?, parse_stay_date(&self.check_out)?))
    }

    pub fn nights(&self) -> Option<i64> {
        self.stay_dates()
            .map(|(check_in, check_out)| (check_out - check_in).num_days())
    }

    pub fn total_guests(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    /// Canonical camelCase fields layered over the original submission, so
    /// the booking script sees its expected keys plus anything extra the
    /// form sent (room name, quoted total, ...).
    pub fn to_outbound(&self, original: &Map<String, Value>) -> Map<String, Value> {
        let mut outbound = original.clone();
        if let Ok(Value::Object(canonical)) = serde_json::to_value(self) {
            outbound.extend(canonical);
        }
        if let Some(nights) = self.nights() {
            outbound.insert("nights".to_string(), Value::from(nights));
        }
        outbound
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp from a date picker.
pub fn parse_stay_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("full_name_required", "Full name is required"));
    }
    if value.trim().chars().count() > 100 {
        return Err(new_validation_error("full_name_too_long", "Full name is too long"));
    }
    Ok(())
}

fn validate_room_type(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("room_type_required", "Please select a room type"));
    }
    Ok(())
}

fn validate_stay_date(value: &str) -> Result<(), ValidationError> {
    if parse_stay_date(value).is_none() {
        return Err(new_validation_error("invalid_date", "Dates must use the YYYY-MM-DD format"));
    }
    Ok(())
}

fn validate_stay(request: &BookingRequest) -> Result<(), ValidationError> {
    let Some((check_in, check_out)) = request.stay_dates() else {
        // Unparseable dates are reported per field.
        return Ok(());
    };

    if check_out <= check_in {
        return Err(new_validation_error(
            "check_out_before_check_in",
            "Check-out date must be after check-in date",
        ));
    }
    if check_in < Utc::now().date_naive() {
        return Err(new_validation_error("check_in_past", "Check-in date cannot be in the past"));
    }
    Ok(())
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

/// Guest counts arrive as numbers from JSON clients and as strings from
/// forms.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Float(f64),
        Text(String),
    }

    let parsed = match Count::deserialize(deserializer)? {
        Count::Number(n) => Some(n),
        Count::Float(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
        Count::Float(_) => None,
        Count::Text(s) => s.trim().parse::<u64>().ok(),
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| de::Error::custom("guest counts must be whole numbers"))
}
