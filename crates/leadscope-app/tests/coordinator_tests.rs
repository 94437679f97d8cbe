// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use leadscope_app::{
    ActiveView, AppEvent, Coordinator, GatewayError, Intent, LeadId, NoticeLevel, SearchParams,
    SearchPlatform, normalize_lead,
};
use leadscope_testkit::{Call, FakeBackend, LeadFaker, Operation, group_lead_raw, legacy_history_raw};

fn notices(events: &[AppEvent]) -> Vec<(NoticeLevel, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::Notice(notice) => Some((notice.level, notice.message.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn start_loads_config_history_and_saved_leads() {
    let backend = FakeBackend::new()
        .with_history(vec![legacy_history_raw()])
        .with_saved_leads(vec![group_lead_raw()])
        .with_audience_config(serde_json::json!({ "segment": "founders" }));
    let mut coordinator = Coordinator::new();

    let events = coordinator.run_blocking(&backend, Intent::Start);
    assert!(events.contains(&AppEvent::HistoryRefreshed { count: 1 }));
    assert!(events.contains(&AppEvent::SavedLeadsRefreshed { count: 1 }));
    assert!(events.contains(&AppEvent::AudienceConfigChanged));

    let state = coordinator.state();
    assert_eq!(state.history[0].location, "Austin, TX");
    assert!(coordinator.is_lead_saved(&LeadId::new("tg_rustaceans")));
    assert_eq!(
        state
            .audience_config
            .as_ref()
            .and_then(|config| config.summary()),
        Some("segment: founders".to_owned())
    );
}

#[test]
fn start_survives_every_load_failing() {
    let backend = FakeBackend::new();
    let down = GatewayError::Transport("connection refused".to_owned());
    backend.fail(Operation::History, down.clone());
    backend.fail(Operation::SavedLeads, down.clone());
    backend.fail(Operation::AudienceConfig, down);
    let mut coordinator = Coordinator::new();

    let events = coordinator.run_blocking(&backend, Intent::Start);
    assert!(events.is_empty());
    assert!(coordinator.state().history.is_empty());
    assert!(coordinator.state().audience_config.is_none());
}

#[test]
fn search_replaces_results_and_refreshes_history() {
    let backend =
        FakeBackend::new().with_search_results("AI founders", LeadFaker::new(9).leads("AI", 12));
    let mut coordinator = Coordinator::new();
    coordinator.dispatch(Intent::SwitchView(ActiveView::Leads));

    let params = SearchParams::new("AI founders", "Berlin", SearchPlatform::LinkedIn, 20);
    let events = coordinator.run_blocking(&backend, Intent::SubmitSearch(params.clone()));

    assert_eq!(events.first(), Some(&AppEvent::LoadingChanged(true)));
    assert!(events.contains(&AppEvent::ResultsReplaced { count: 12 }));
    assert!(events.contains(&AppEvent::HistoryRefreshed { count: 1 }));
    assert!(events.contains(&AppEvent::LoadingChanged(false)));

    let state = coordinator.state();
    assert!(!state.loading);
    assert_eq!(state.active_view, ActiveView::Search);
    assert_eq!(state.results.len(), 12);
    assert_eq!(state.history[0].keyword, "AI founders");
    assert_eq!(backend.calls()[0], Call::Search(params));
}

#[test]
fn empty_keyword_never_reaches_the_backend() {
    let backend = FakeBackend::new();
    let mut coordinator = Coordinator::new();

    let params = SearchParams::new("", "Berlin", SearchPlatform::X, 20);
    let events = coordinator.run_blocking(&backend, Intent::SubmitSearch(params));

    assert!(!events.contains(&AppEvent::LoadingChanged(true)));
    assert_eq!(notices(&events).len(), 1);
    assert_eq!(notices(&events)[0].0, NoticeLevel::Warning);
    assert!(backend.calls().is_empty());
}

#[test]
fn failed_search_reports_server_detail_and_keeps_results() {
    let backend = FakeBackend::new().with_search_results("rust", LeadFaker::new(1).leads("rust", 3));
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(
        &backend,
        Intent::SubmitSearch(SearchParams::new("rust", "", SearchPlatform::LinkedIn, 20)),
    );

    backend.fail(
        Operation::Search,
        GatewayError::Application("Unknown error".to_owned()),
    );
    let events = coordinator.run_blocking(
        &backend,
        Intent::SubmitSearch(SearchParams::new("go", "", SearchPlatform::LinkedIn, 20)),
    );

    assert_eq!(
        notices(&events),
        vec![(NoticeLevel::Error, "Search failed: Unknown error".to_owned())]
    );
    assert_eq!(coordinator.state().results.len(), 3);
    assert!(!coordinator.is_loading());
}

#[test]
fn replaying_legacy_history_uses_defaults() {
    let backend = FakeBackend::new()
        .with_history(vec![legacy_history_raw()])
        .with_search_results("Web3", LeadFaker::new(3).leads("Web3", 2));
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(&backend, Intent::Start);

    let entry = coordinator.state().history[0].clone();
    coordinator.run_blocking(&backend, Intent::ReplayHistory(entry));

    let searches = backend
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Search(params) => Some(params),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        searches,
        vec![SearchParams::new("Web3", "Austin, TX", SearchPlatform::LinkedIn, 20)]
    );
    assert_eq!(coordinator.state().results.len(), 2);
}

#[test]
fn replaying_nested_history_keeps_its_platform() {
    let backend = FakeBackend::new()
        .with_history(vec![serde_json::json!({
            "id": "hist_nyc",
            "params": {
                "keyword": "Web3",
                "city": "NYC",
                "state": "NY",
                "platform": "x",
            },
        })])
        .with_search_results("Web3", LeadFaker::new(4).leads("Web3", 1));
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(&backend, Intent::Start);

    let entry = coordinator.state().history[0].clone();
    coordinator.run_blocking(&backend, Intent::ReplayHistory(entry));

    assert!(backend.calls().contains(&Call::Search(SearchParams::new(
        "Web3",
        "NYC, NY",
        SearchPlatform::X,
        20,
    ))));
    assert_eq!(coordinator.state().results.len(), 1);
}

#[test]
fn saving_is_idempotent_per_id() {
    let backend = FakeBackend::new();
    let mut coordinator = Coordinator::new();
    let lead = normalize_lead(&group_lead_raw());

    let events = coordinator.run_blocking(&backend, Intent::SaveLead(lead.clone()));
    assert_eq!(
        notices(&events),
        vec![(NoticeLevel::Info, "Lead saved successfully!".to_owned())]
    );
    assert!(events.contains(&AppEvent::SavedLeadsRefreshed { count: 1 }));

    let events = coordinator.run_blocking(&backend, Intent::SaveLead(lead));
    assert_eq!(notices(&events)[0].0, NoticeLevel::Info);
    assert_eq!(
        backend.count_calls(|call| matches!(call, Call::SaveLead(_))),
        1
    );
    assert_eq!(coordinator.state().saved_leads.len(), 1);
}

#[test]
fn saving_sends_unrecognized_fields_back() {
    let backend = FakeBackend::new();
    let mut coordinator = Coordinator::new();
    let raw = LeadFaker::new(5).x_lead("rust");
    let lead = normalize_lead(&raw);

    coordinator.run_blocking(&backend, Intent::SaveLead(lead));
    let stored = backend.raw_leads();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["likes"], raw["likes"]);
    assert_eq!(stored[0]["id"], raw["id"]);
}

#[test]
fn deleting_the_open_lead_closes_the_detail() {
    let backend = FakeBackend::new().with_saved_leads(vec![group_lead_raw()]);
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(&backend, Intent::Start);

    let lead = coordinator.state().saved_leads[0].clone();
    coordinator.dispatch(Intent::SelectLead(lead));
    assert!(coordinator.state().selected_lead.is_some());

    let events =
        coordinator.run_blocking(&backend, Intent::DeleteLead(LeadId::new("tg_rustaceans")));
    assert!(events.contains(&AppEvent::DetailClosed));
    assert!(events.contains(&AppEvent::SavedLeadsRefreshed { count: 0 }));
    assert!(coordinator.state().selected_lead.is_none());
    assert!(!coordinator.is_lead_saved(&LeadId::new("tg_rustaceans")));
}

#[test]
fn deleting_another_lead_keeps_the_selection() {
    let backend = FakeBackend::new().with_saved_leads(vec![group_lead_raw()]);
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(&backend, Intent::Start);
    coordinator.dispatch(Intent::SelectLead(normalize_lead(
        &LeadFaker::new(2).linkedin_lead("rust"),
    )));

    let events =
        coordinator.run_blocking(&backend, Intent::DeleteLead(LeadId::new("tg_rustaceans")));
    assert!(!events.contains(&AppEvent::DetailClosed));
    assert!(coordinator.state().selected_lead.is_some());
}

#[test]
fn failed_delete_leaves_saved_list_untouched() {
    let backend = FakeBackend::new().with_saved_leads(vec![group_lead_raw()]);
    let mut coordinator = Coordinator::new();
    coordinator.run_blocking(&backend, Intent::Start);
    backend.fail(
        Operation::DeleteLead,
        GatewayError::Transport("connection reset".to_owned()),
    );

    let events =
        coordinator.run_blocking(&backend, Intent::DeleteLead(LeadId::new("tg_rustaceans")));
    assert_eq!(
        notices(&events),
        vec![(
            NoticeLevel::Error,
            "Failed to delete lead: connection reset".to_owned()
        )]
    );
    assert_eq!(coordinator.state().saved_leads.len(), 1);
}

#[test]
fn csv_export_writes_the_file() -> Result<()> {
    let backend = FakeBackend::new().with_saved_leads(vec![group_lead_raw()]);
    let mut coordinator = Coordinator::new();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("exports").join("leads.csv");

    let events = coordinator.run_blocking(&backend, Intent::DownloadCsv(path.clone()));
    let written = std::fs::read_to_string(&path)?;
    assert!(written.starts_with("id,name,platform,role\n"));
    assert!(written.contains("tg_rustaceans"));
    assert!(events.contains(&AppEvent::CsvExported {
        path,
        bytes: written.len(),
    }));
    Ok(())
}

#[test]
fn csv_export_failure_is_reported() {
    let backend = FakeBackend::new();
    backend.fail(
        Operation::ExportCsv,
        GatewayError::Transport("timed out".to_owned()),
    );
    let mut coordinator = Coordinator::new();

    let before = coordinator.state().clone();
    let events = coordinator.run_blocking(
        &backend,
        Intent::DownloadCsv(std::env::temp_dir().join("leadscope-never-written.csv")),
    );
    assert_eq!(notices(&events)[0].0, NoticeLevel::Error);
    assert!(notices(&events)[0].1.contains("timed out"));
    assert_eq!(coordinator.state(), &before);
}
