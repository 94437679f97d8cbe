// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Test doubles for the lead backend: deterministic raw payloads and an
//! in-memory [`FakeBackend`] that stores records the way the server does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use leadscope_app::{
    AudienceConfig, Gateway, GatewayError, HistoryEntry, Lead, LeadId, SearchParams,
    check_envelope, decode_audience_config_response, decode_history_response,
    decode_saved_leads_response, decode_search_response, lead_to_wire,
};
use serde_json::{Value, json};

const FIRST_NAMES: [&str; 10] = [
    "Ada", "Grace", "Linus", "Margaret", "Ken", "Barbara", "Dennis", "Frances", "Guido", "Radia",
];

const LAST_NAMES: [&str; 10] = [
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Thompson", "Liskov", "Ritchie", "Allen",
    "Rossum", "Perlman",
];

const ROLES: [&str; 8] = [
    "Founder",
    "CTO",
    "Head of Growth",
    "Staff Engineer",
    "VP Sales",
    "Product Lead",
    "Community Manager",
    "Investor",
];

const COMPANIES: [&str; 8] = [
    "Acme Labs",
    "Northwind",
    "Globex",
    "Initech",
    "Umbrella",
    "Hooli",
    "Stark Industries",
    "Wayne Enterprises",
];

const REGIONS: [&str; 6] = [
    "Berlin, DE",
    "Austin, TX",
    "London, UK",
    "Lisbon, PT",
    "Toronto, CA",
    "Singapore",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Produces raw lead payloads shaped like the backend's per-platform output.
#[derive(Debug, Clone)]
pub struct LeadFaker {
    rng: DeterministicRng,
    serial: u64,
}

impl LeadFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            serial: 0,
        }
    }

    pub fn linkedin_lead(&mut self, keyword: &str) -> Value {
        self.serial += 1;
        let name = self.full_name();
        let role = self.pick(&ROLES);
        let company = self.pick(&COMPANIES);
        json!({
            "id": format!("li_{:04}", self.serial),
            "name": name,
            "platform": "LinkedIn",
            "role": role,
            "company": company,
            "region": self.pick(&REGIONS),
            "industry": "Software",
            "headline": format!("{role} at {company}"),
            "followers": 100 + self.rng.int_n(50_000),
            "contact_link": format!("https://www.linkedin.com/in/lead-{}", self.serial),
            "notes": keyword,
        })
    }

    pub fn x_lead(&mut self, keyword: &str) -> Value {
        self.serial += 1;
        let name = self.full_name();
        let handle = name.to_ascii_lowercase().replace(' ', "_");
        json!({
            "id": format!("x_{:04}", self.serial),
            "name": name,
            "platform": "X",
            "role": format!("@{handle}"),
            "bio": format!("Talking about {keyword}"),
            "followers": self.rng.int_n(3_000_000),
            "verified": self.rng.bool(),
            "likes": self.rng.int_n(10_000),
            "contact_link": format!("https://x.com/{handle}"),
            "notes": keyword,
        })
    }

    pub fn leads(&mut self, keyword: &str, count: usize) -> Vec<Value> {
        (0..count)
            .map(|index| {
                if index % 2 == 0 {
                    self.linkedin_lead(keyword)
                } else {
                    self.x_lead(keyword)
                }
            })
            .collect()
    }

    fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values[self.rng.int_n(values.len())]
    }
}

/// A community-style record: description instead of bio, members instead of
/// followers, and an unrecognized platform label.
pub fn group_lead_raw() -> Value {
    json!({
        "id": "tg_rustaceans",
        "name": "Rustaceans Berlin",
        "platform": "Telegram",
        "description": "Local Rust meetup group",
        "members": 2400,
        "followers": 0,
    })
}

/// An older history shape with everything nested under `params` and the
/// location split into city and state.
pub fn legacy_history_raw() -> Value {
    json!({
        "id": "hist_legacy",
        "timestamp": "2024-06-01T09:30:00",
        "params": {
            "keyword": "Web3",
            "city": "Austin",
            "state": "TX",
        },
        "result_count": 7,
    })
}

pub fn fixture_timestamp() -> &'static str {
    "2025-01-15T10:00:00"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    History,
    SavedLeads,
    AudienceConfig,
    SaveLead,
    DeleteLead,
    ExportCsv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchParams),
    History,
    SavedLeads,
    AudienceConfig,
    SaveLead(Value),
    DeleteLead(LeadId),
    ExportCsv,
}

#[derive(Debug, Default)]
struct BackendState {
    search_results: HashMap<String, Vec<Value>>,
    history: Vec<Value>,
    leads: Vec<Value>,
    audience_config: Option<Value>,
    failures: HashMap<Operation, GatewayError>,
    calls: Vec<Call>,
    next_id: u64,
}

/// In-memory backend. History is newest-first; saving an id that is already
/// stored is acknowledged without creating a duplicate.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw results returned for searches whose trimmed keyword matches.
    pub fn with_search_results(self, keyword: &str, results: Vec<Value>) -> Self {
        self.state()
            .search_results
            .insert(keyword.trim().to_owned(), results);
        self
    }

    pub fn with_history(self, entries: Vec<Value>) -> Self {
        self.state().history = entries;
        self
    }

    pub fn with_saved_leads(self, leads: Vec<Value>) -> Self {
        self.state().leads = leads;
        self
    }

    pub fn with_audience_config(self, config: Value) -> Self {
        self.state().audience_config = Some(config);
        self
    }

    /// Every later call to `operation` fails with `error` until cleared.
    pub fn fail(&self, operation: Operation, error: GatewayError) {
        self.state().failures.insert(operation, error);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn raw_leads(&self) -> Vec<Value> {
        self.state().leads.clone()
    }

    pub fn raw_history(&self) -> Vec<Value> {
        self.state().history.clone()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn begin(
        &self,
        operation: Operation,
        call: Call,
    ) -> Result<MutexGuard<'_, BackendState>, GatewayError> {
        let mut state = self.state();
        state.calls.push(call);
        match state.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

impl Gateway for FakeBackend {
    fn submit_search(&self, params: &SearchParams) -> Result<Vec<Lead>, GatewayError> {
        let mut state = self.begin(Operation::Search, Call::Search(params.clone()))?;
        let results = state
            .search_results
            .get(params.keyword.trim())
            .cloned()
            .unwrap_or_default();

        state.next_id += 1;
        let entry = json!({
            "id": format!("hist_{}", state.next_id),
            "timestamp": fixture_timestamp(),
            "params": params,
            "result_count": results.len(),
        });
        state.history.insert(0, entry);

        decode_search_response(&json!({ "status": "success", "results": results }))
    }

    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GatewayError> {
        let state = self.begin(Operation::History, Call::History)?;
        Ok(decode_history_response(&json!({ "history": state.history })))
    }

    fn fetch_saved_leads(&self) -> Result<Vec<Lead>, GatewayError> {
        let state = self.begin(Operation::SavedLeads, Call::SavedLeads)?;
        Ok(decode_saved_leads_response(&json!({ "leads": state.leads })))
    }

    fn fetch_audience_config(&self) -> Result<Option<AudienceConfig>, GatewayError> {
        let state = self.begin(Operation::AudienceConfig, Call::AudienceConfig)?;
        Ok(decode_audience_config_response(
            &json!({ "data": state.audience_config }),
        ))
    }

    fn save_lead(&self, lead: &Lead) -> Result<(), GatewayError> {
        let mut wire = lead_to_wire(lead);
        let mut state = self.begin(Operation::SaveLead, Call::SaveLead(wire.clone()))?;

        if wire.get("id").and_then(Value::as_str).is_none() {
            state.next_id += 1;
            wire["id"] = Value::String(format!("lead_{}", state.next_id));
        }
        let id = wire["id"].clone();
        if state.leads.iter().any(|stored| stored["id"] == id) {
            return check_envelope(&json!({ "status": "success" }));
        }
        wire["saved_at"] = Value::String(fixture_timestamp().to_owned());
        state.leads.push(wire);
        check_envelope(&json!({ "status": "success" }))
    }

    fn delete_lead(&self, id: &LeadId) -> Result<(), GatewayError> {
        let mut state = self.begin(Operation::DeleteLead, Call::DeleteLead(id.clone()))?;
        let before = state.leads.len();
        state
            .leads
            .retain(|stored| stored["id"].as_str() != Some(id.as_str()));
        if state.leads.len() == before {
            return check_envelope(&json!({ "status": "error", "detail": "Lead not found" }));
        }
        check_envelope(&json!({ "status": "success" }))
    }

    fn export_csv(&self) -> Result<Vec<u8>, GatewayError> {
        let state = self.begin(Operation::ExportCsv, Call::ExportCsv)?;
        let mut csv = String::from("id,name,platform,role\n");
        for lead in &state.leads {
            let cell = |key: &str| lead[key].as_str().unwrap_or_default().replace(',', " ");
            csv.push_str(&format!(
                "{},{},{},{}\n",
                cell("id"),
                cell("name"),
                cell("platform"),
                cell("role")
            ));
        }
        Ok(csv.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::{Call, FakeBackend, LeadFaker, Operation, group_lead_raw, legacy_history_raw};
    use leadscope_app::{
        Gateway, GatewayError, LeadId, Platform, SearchParams, SearchPlatform, normalize_lead,
    };

    #[test]
    fn faker_is_deterministic() {
        let mut left = LeadFaker::new(42);
        let mut right = LeadFaker::new(42);
        assert_eq!(left.leads("rust", 4), right.leads("rust", 4));
    }

    #[test]
    fn faker_alternates_platforms() {
        let leads = LeadFaker::new(7)
            .leads("rust", 4)
            .iter()
            .map(normalize_lead)
            .collect::<Vec<_>>();
        assert_eq!(leads[0].platform, Platform::LinkedIn);
        assert_eq!(leads[1].platform, Platform::X);
        assert!(leads[1].extra.contains_key("likes"));
    }

    #[test]
    fn search_records_history_newest_first() -> Result<(), GatewayError> {
        let backend = FakeBackend::new()
            .with_history(vec![legacy_history_raw()])
            .with_search_results("rust", LeadFaker::new(1).leads("rust", 3));

        let params = SearchParams::new("rust", "Berlin", SearchPlatform::X, 20);
        assert_eq!(backend.submit_search(&params)?.len(), 3);

        let history = backend.fetch_history()?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].keyword, "rust");
        assert_eq!(history[0].platform, "x");
        assert_eq!(history[0].result_count, Some(3));
        assert_eq!(history[1].location, "Austin, TX");
        Ok(())
    }

    #[test]
    fn saving_twice_keeps_one_copy() -> Result<(), GatewayError> {
        let backend = FakeBackend::new();
        let lead = normalize_lead(&group_lead_raw());
        backend.save_lead(&lead)?;
        backend.save_lead(&lead)?;

        let saved = backend.fetch_saved_leads()?;
        assert_eq!(saved.len(), 1);
        assert!(saved[0].saved_at.is_some());
        Ok(())
    }

    #[test]
    fn injected_failures_are_recorded_and_returned() {
        let backend = FakeBackend::new();
        backend.fail(
            Operation::DeleteLead,
            GatewayError::Transport("connection refused".to_owned()),
        );
        let error = backend
            .delete_lead(&LeadId::new("x"))
            .expect_err("delete should fail");
        assert_eq!(error, GatewayError::Transport("connection refused".to_owned()));
        assert_eq!(backend.calls(), vec![Call::DeleteLead(LeadId::new("x"))]);

        backend.clear_failures();
        let error = backend
            .delete_lead(&LeadId::new("x"))
            .expect_err("unknown id should fail");
        assert_eq!(error, GatewayError::Application("Lead not found".to_owned()));
    }
}
