use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value a client writes into the date field to join the waitlist when the
/// whole season is booked.
pub const WAITLIST_MARKER: &str = "waitlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightOption {
    ClearRed,
    ClearWarm,
    Alternating,
}

impl LightOption {
    pub const fn ordered() -> [Self; 3] {
        [Self::ClearRed, Self::ClearWarm, Self::Alternating]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClearRed => "clear-red",
            Self::ClearWarm => "clear-warm",
            Self::Alternating => "alternating",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ClearRed => "C9 Clear Bulb Red",
            Self::ClearWarm => "C9 Clear Bulb Warm White",
            Self::Alternating => "Alternating Pattern",
        }
    }

    pub const fn needs_tip_color(self) -> bool {
        matches!(self, Self::Alternating)
    }
}

impl FromStr for LightOption {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "clear-red" => Ok(Self::ClearRed),
            "clear-warm" => Ok(Self::ClearWarm),
            "alternating" => Ok(Self::Alternating),
            other => Err(UnknownValue {
                kind: "light option",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipColor {
    Red,
    White,
}

impl TipColor {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::White => "white",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red Tips",
            Self::White => "White Tips",
        }
    }
}

impl FromStr for TipColor {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "red" => Ok(Self::Red),
            "white" => Ok(Self::White),
            other => Err(UnknownValue {
                kind: "tip color",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// Form inputs addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Address,
    Phone,
    Email,
    Date,
    LightOption,
    TipColor,
    AgreeTerms,
}

impl FormField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Date => "date",
            Self::LightOption => "lightOption",
            Self::TipColor => "tipColor",
            Self::AgreeTerms => "agreeTerms",
        }
    }

    pub const fn is_checkbox(self) -> bool {
        matches!(self, Self::AgreeTerms)
    }
}

impl FromStr for FormField {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "name" => Ok(Self::Name),
            "address" => Ok(Self::Address),
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "date" => Ok(Self::Date),
            "lightOption" => Ok(Self::LightOption),
            "tipColor" => Ok(Self::TipColor),
            "agreeTerms" => Ok(Self::AgreeTerms),
            other => Err(UnknownValue {
                kind: "form field",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw input as delivered by the form: checkboxes carry booleans, everything
/// else carries text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

/// What the date field currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateChoice {
    Unselected,
    Date(NaiveDate),
    Waitlist,
    Unreadable,
}

/// The in-progress booking. Text stays raw until submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub light_option: Option<LightOption>,
    pub tip_color: String,
    pub agree_terms: bool,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            date: String::new(),
            light_option: Some(LightOption::ClearRed),
            tip_color: String::new(),
            agree_terms: false,
        }
    }
}

impl BookingDraft {
    pub fn date_choice(&self) -> DateChoice {
        let raw = self.date.trim();
        if raw.is_empty() {
            DateChoice::Unselected
        } else if raw.eq_ignore_ascii_case(WAITLIST_MARKER) {
            DateChoice::Waitlist
        } else {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(DateChoice::Date)
                .unwrap_or(DateChoice::Unreadable)
        }
    }

    pub fn tip_color(&self) -> Option<TipColor> {
        self.tip_color.parse().ok()
    }

    /// Presence only: whatever the customer typed counts, spaces included.
    pub fn has_contact_details(&self) -> bool {
        [&self.name, &self.address, &self.phone, &self.email]
            .iter()
            .all(|value| !value.is_empty())
    }

    /// Option chosen and, for the alternating pattern, a tip color picked.
    pub fn has_light_selection(&self) -> bool {
        match self.light_option {
            Some(option) if option.needs_tip_color() => self.tip_color().is_some(),
            Some(_) => true,
            None => false,
        }
    }
}

/// Installation slot requested by a validated booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "date")]
pub enum RequestedDate {
    Date(NaiveDate),
    /// Season sold out; the customer asked to be waitlisted without a date.
    WaitlistOnly,
}

impl RequestedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(date),
            Self::WaitlistOnly => None,
        }
    }
}

/// A booking that passed every submission precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub installation_date: RequestedDate,
    pub light_option: LightOption,
    pub tip_color: Option<TipColor>,
    pub agreed_to_terms: bool,
}

pub(crate) fn us_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
