// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Conversion of raw backend payloads into [`Lead`] and [`HistoryEntry`].
//!
//! Every function here is total: malformed or partial input degrades to absent
//! fields, never to an error.

use serde_json::{Map, Value};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::{HistoryEntry, HistoryEntryId, Lead, LeadId, Platform, Popularity};

pub const POPULARITY_PLACEHOLDER: &str = "-";

const LEAD_FIELDS: [&str; 17] = [
    "id",
    "name",
    "platform",
    "role",
    "region",
    "company",
    "industry",
    "headline",
    "bio",
    "email",
    "website",
    "contact_link",
    "verified",
    "notes",
    "followers",
    "members",
    "saved_at",
];

pub fn normalize_lead(raw: &Value) -> Lead {
    let Some(object) = raw.as_object() else {
        return Lead::new(Platform::Other(String::new()));
    };

    let followers = present(object, "followers").and_then(count);
    let members = present(object, "members").and_then(count);
    let popularity = match (followers, members) {
        (Some(followers), _) if followers > 0 => Some(Popularity::Followers(followers)),
        (_, Some(members)) if members > 0 => Some(Popularity::Members(members)),
        _ => None,
    };

    let extra = object
        .iter()
        .filter(|(key, _)| !LEAD_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut lead = Lead::new(
        present(object, "platform")
            .and_then(text)
            .map(|label| Platform::parse(&label))
            .unwrap_or_else(|| Platform::Other(String::new())),
    );
    lead.id = present(object, "id").and_then(text).map(LeadId::from);
    lead.name = text_field(object, "name");
    lead.role = text_field(object, "role");
    lead.region = text_field(object, "region");
    lead.company = text_field(object, "company");
    lead.industry = text_field(object, "industry");
    lead.headline = text_field(object, "headline");
    lead.bio = text_field(object, "bio").or_else(|| text_field(object, "description"));
    lead.email = text_field(object, "email");
    lead.website = text_field(object, "website");
    lead.contact_link = text_field(object, "contact_link");
    lead.verified = present(object, "verified").is_some_and(flag);
    lead.notes = text_field(object, "notes");
    lead.popularity = popularity;
    lead.saved_at = text_field(object, "saved_at");
    lead.extra = extra;
    lead
}

pub fn normalize_leads(raw: &Value) -> Vec<Lead> {
    raw.as_array()
        .map(|items| items.iter().map(normalize_lead).collect())
        .unwrap_or_default()
}

/// Wire shape for `POST /leads`. Unrecognized fields received from the server
/// are sent back untouched.
pub fn lead_to_wire(lead: &Lead) -> Value {
    let mut object = lead.extra.clone();
    let mut put = |key: &str, value: Option<&String>| {
        if let Some(value) = value {
            object.insert(key.to_owned(), Value::String(value.clone()));
        }
    };
    put("id", lead.id.as_ref().map(|id| id.to_string()).as_ref());
    put("name", lead.name.as_ref());
    put("role", lead.role.as_ref());
    put("region", lead.region.as_ref());
    put("company", lead.company.as_ref());
    put("industry", lead.industry.as_ref());
    put("headline", lead.headline.as_ref());
    // A bio read from `description` goes back under that key only.
    let description = lead.extra.get("description").and_then(Value::as_str);
    if lead.bio.as_deref() != description {
        put("bio", lead.bio.as_ref());
    }
    put("email", lead.email.as_ref());
    put("website", lead.website.as_ref());
    put("contact_link", lead.contact_link.as_ref());
    put("notes", lead.notes.as_ref());
    put("saved_at", lead.saved_at.as_ref());

    object.insert(
        "platform".to_owned(),
        Value::String(lead.platform.as_str().to_owned()),
    );
    object.insert("verified".to_owned(), Value::Bool(lead.verified));
    match lead.popularity {
        Some(Popularity::Followers(count)) => {
            object.insert("followers".to_owned(), Value::from(count));
        }
        Some(Popularity::Members(count)) => {
            object.insert("members".to_owned(), Value::from(count));
        }
        None => {}
    }
    Value::Object(object)
}

pub fn normalize_history_entry(raw: &Value) -> HistoryEntry {
    let Some(object) = raw.as_object() else {
        return HistoryEntry {
            id: None,
            keyword: String::new(),
            location: String::new(),
            platform: "linkedin".to_owned(),
            max_results: None,
            result_count: None,
            timestamp: None,
        };
    };
    let params = object.get("params").and_then(Value::as_object);
    let lookup = |key: &str| -> Option<&Value> {
        present(object, key).or_else(|| params.and_then(|params| present(params, key)))
    };

    let location = lookup("location").and_then(text).unwrap_or_else(|| {
        let city = lookup("city").and_then(text);
        let state = lookup("state").and_then(text);
        synthesize_location(city.as_deref(), state.as_deref())
    });

    HistoryEntry {
        id: lookup("id").and_then(text).map(HistoryEntryId::from),
        keyword: lookup("keyword").and_then(text).unwrap_or_default(),
        location,
        platform: lookup("platform")
            .and_then(text)
            .unwrap_or_else(|| "linkedin".to_owned()),
        max_results: lookup("max_results").and_then(count),
        result_count: lookup("result_count").and_then(count),
        timestamp: lookup("timestamp").and_then(text),
    }
}

pub fn normalize_history(raw: &Value) -> Vec<HistoryEntry> {
    raw.as_array()
        .map(|items| items.iter().map(normalize_history_entry).collect())
        .unwrap_or_default()
}

/// Joins city and state with `", "`, dropping whichever side is empty.
pub fn synthesize_location(city: Option<&str>, state: Option<&str>) -> String {
    [city, state]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compact follower/member count: `1.5K`, `2.5M`, or the bare integer.
/// Zero and absent counts have no rendering.
pub fn format_popularity(count: Option<u64>) -> Option<String> {
    let count = count.filter(|count| *count > 0)?;
    let rendered = if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    };
    Some(rendered)
}

pub fn timestamp_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value.date());
    }
    if let Ok(value) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(value.date());
    }
    let prefix = raw.get(..10)?;
    Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok()
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    })
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    present(object, key).and_then(text)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(|value| value.trunc() as u64)
        }),
        Value::String(text) => {
            let trimmed = text.trim().replace(',', "");
            trimmed.parse::<u64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value >= 0.0)
                    .map(|value| value.trunc() as u64)
            })
        }
        _ => None,
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        Value::Number(number) => number.as_i64().is_some_and(|value| value != 0),
        _ => false,
    }
}
