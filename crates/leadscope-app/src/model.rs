// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;

use crate::ids::*;
use crate::normalize::timestamp_date;

pub const DEFAULT_MAX_RESULTS: u32 = 20;
pub const MIN_MAX_RESULTS: u32 = 1;
pub const MAX_MAX_RESULTS: u32 = 100;

/// Platform tag carried by a lead. Unknown labels are kept verbatim so the
/// renderers can fall back to generic styling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    LinkedIn,
    X,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LinkedIn => "LinkedIn",
            Self::X => "X",
            Self::Other(label) => label,
        }
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "linkedin" => Self::LinkedIn,
            "x" | "twitter" => Self::X,
            _ => Self::Other(trimmed.to_owned()),
        }
    }

    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Platforms the search endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPlatform {
    #[default]
    LinkedIn,
    X,
}

impl SearchPlatform {
    pub const ALL: [Self; 2] = [Self::LinkedIn, Self::X];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinkedIn => "linkedin",
            Self::X => "x",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LinkedIn => "LinkedIn",
            Self::X => "X (Twitter)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Some(Self::LinkedIn),
            "x" | "twitter" => Some(Self::X),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::LinkedIn => Self::X,
            Self::X => Self::LinkedIn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Popularity {
    Followers(u64),
    Members(u64),
}

impl Popularity {
    pub const fn count(self) -> u64 {
        match self {
            Self::Followers(count) | Self::Members(count) => count,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Followers(_) => "Followers",
            Self::Members(_) => "Members",
        }
    }
}

/// A normalized contact record. Leads are never edited in place; saving one
/// posts a copy to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: Option<LeadId>,
    pub name: Option<String>,
    pub platform: Platform,
    pub role: Option<String>,
    pub region: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub contact_link: Option<String>,
    pub verified: bool,
    pub notes: Option<String>,
    pub popularity: Option<Popularity>,
    pub saved_at: Option<String>,
    pub extra: Map<String, Value>,
}

impl Lead {
    pub fn new(platform: Platform) -> Self {
        Self {
            id: None,
            name: None,
            platform,
            role: None,
            region: None,
            company: None,
            industry: None,
            headline: None,
            bio: None,
            email: None,
            website: None,
            contact_link: None,
            verified: false,
            notes: None,
            popularity: None,
            saved_at: None,
            extra: Map::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn popularity_count(&self) -> Option<u64> {
        self.popularity.map(Popularity::count)
    }

    /// Headline worth showing next to the role; hidden when it repeats it.
    pub fn distinct_headline(&self) -> Option<&str> {
        let headline = self.headline.as_deref()?;
        if self.role.as_deref() == Some(headline) {
            return None;
        }
        Some(headline)
    }
}

/// A past search as stored by the server, already resolved through the
/// top-level/`params` fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: Option<HistoryEntryId>,
    pub keyword: String,
    pub location: String,
    pub platform: String,
    pub max_results: Option<u64>,
    pub result_count: Option<u64>,
    pub timestamp: Option<String>,
}

impl HistoryEntry {
    pub fn date(&self) -> Option<Date> {
        self.timestamp.as_deref().and_then(timestamp_date)
    }

    pub fn replay_params(&self) -> SearchParams {
        let platform = SearchPlatform::parse(&self.platform).unwrap_or_default();
        let max_results = self
            .max_results
            .filter(|value| *value > 0)
            .map(|value| i64::try_from(value).unwrap_or(i64::MAX))
            .unwrap_or(i64::from(DEFAULT_MAX_RESULTS));
        SearchParams::new(
            self.keyword.clone(),
            self.location.clone(),
            platform,
            max_results,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub keyword: String,
    pub location: String,
    pub platform: SearchPlatform,
    pub max_results: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            location: String::new(),
            platform: SearchPlatform::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchParams {
    pub fn new(
        keyword: impl Into<String>,
        location: impl Into<String>,
        platform: SearchPlatform,
        max_results: i64,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
            platform,
            max_results: clamp_max_results(max_results),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            bail!("enter a keyword before searching");
        }
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&self.max_results) {
            bail!(
                "result count must be between {MIN_MAX_RESULTS} and {MAX_MAX_RESULTS}, got {}",
                self.max_results
            );
        }
        Ok(())
    }
}

pub fn clamp_max_results(value: i64) -> u32 {
    let clamped = value.clamp(i64::from(MIN_MAX_RESULTS), i64::from(MAX_MAX_RESULTS));
    u32::try_from(clamped).unwrap_or(DEFAULT_MAX_RESULTS)
}

/// Opaque audience configuration served by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceConfig {
    pub raw: Value,
}

impl AudienceConfig {
    /// One-line rendering of the top-level scalar entries.
    pub fn summary(&self) -> Option<String> {
        let object = self.raw.as_object()?;
        let parts = object
            .iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) if !text.trim().is_empty() => Some(format!("{key}: {text}")),
                Value::Number(number) => Some(format!("{key}: {number}")),
                Value::Bool(flag) => Some(format!("{key}: {flag}")),
                _ => None,
            })
            .collect::<Vec<_>>();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" · "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveView {
    #[default]
    Search,
    History,
    Leads,
}

impl ActiveView {
    pub const ALL: [Self; 3] = [Self::Search, Self::History, Self::Leads];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::History => "history",
            Self::Leads => "saved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message; the terminal equivalent of a browser alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
