//! # Lead signals
//!
//! Input to scoring: named boolean engagement flags plus an optional enquiry
//! timestamp. Flags live in an ordered map so every pass over them is
//! deterministic.
//!
//! [`LeadRecord`] is the caller-facing lead shape (contact details plus the
//! standard flags); it converts into [`LeadSignals`] and the contact fields
//! never reach the scoring engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSignals {
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enquiry_at: Option<DateTime<Utc>>,
}

impl LeadSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag (builder style).
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    pub fn enquired_at(mut self, ts: DateTime<Utc>) -> Self {
        self.enquiry_at = Some(ts);
        self
    }

    /// Missing flags read as false.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Names of flags that are true, in name order.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
    }
}

/// Lead as submitted by callers (API, CLI). Contact fields are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub demo_requested: bool,
    #[serde(default)]
    pub registration: bool,
    #[serde(default)]
    pub enquiry_call_whatsapp: bool,
    /// RFC3339, or a timestamp without offset read as UTC.
    #[serde(default, deserialize_with = "deserialize_enquiry_date")]
    pub enquiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pricing_compared: bool,
    #[serde(default)]
    pub lead_through_events: bool,
    #[serde(default)]
    pub lead_through_call: bool,
    #[serde(default)]
    pub lead_through_referral: bool,
    /// Additional custom flags; they override the named fields on conflict.
    #[serde(default)]
    pub signals: BTreeMap<String, bool>,
}

/// Parse an enquiry timestamp. Accepts RFC3339 (`2024-02-20T10:00:00Z`),
/// offset-less date-times (`2024-02-20T10:00:00`, `2024-02-20 10:00:00`) and
/// bare dates; anything without an offset is taken as UTC.
pub fn parse_enquiry_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("invalid enquiry_date `{raw}`: expected RFC3339 or YYYY-MM-DDTHH:MM:SS"))
}

fn deserialize_enquiry_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_enquiry_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}

impl From<&LeadRecord> for LeadSignals {
    fn from(r: &LeadRecord) -> Self {
        let mut flags = BTreeMap::new();
        for (name, value) in [
            ("demo_requested", r.demo_requested),
            ("registration", r.registration),
            ("enquiry_call_whatsapp", r.enquiry_call_whatsapp),
            ("pricing_compared", r.pricing_compared),
            ("lead_through_events", r.lead_through_events),
            ("lead_through_call", r.lead_through_call),
            ("lead_through_referral", r.lead_through_referral),
        ] {
            flags.insert(name.to_string(), value);
        }
        for (k, v) in &r.signals {
            flags.insert(k.clone(), *v);
        }
        Self {
            flags,
            enquiry_at: r.enquiry_date,
        }
    }
}

impl From<LeadRecord> for LeadSignals {
    fn from(r: LeadRecord) -> Self {
        LeadSignals::from(&r)
    }
}
