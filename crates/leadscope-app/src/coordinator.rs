// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, warn};

use crate::{
    ActiveView, AudienceConfig, Gateway, GatewayError, HistoryEntry, Lead, LeadId, Notice,
    SearchParams, ViewState,
};

/// A user action sent from a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    SubmitSearch(SearchParams),
    ReplayHistory(HistoryEntry),
    SelectLead(Lead),
    SaveLead(Lead),
    DeleteLead(LeadId),
    CloseDetail,
    SwitchView(ActiveView),
    DownloadCsv(PathBuf),
}

/// Gateway I/O requested by the coordinator. Tasks carry everything they need
/// so they can run off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    LoadAudienceConfig,
    LoadHistory,
    LoadSavedLeads,
    Search { ticket: u64, params: SearchParams },
    SaveLead(Lead),
    DeleteLead(LeadId),
    ExportCsv(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    AudienceConfigLoaded(Result<Option<AudienceConfig>, GatewayError>),
    HistoryLoaded(Result<Vec<HistoryEntry>, GatewayError>),
    SavedLeadsLoaded(Result<Vec<Lead>, GatewayError>),
    SearchFinished {
        ticket: u64,
        result: Result<Vec<Lead>, GatewayError>,
    },
    LeadSaved(Result<(), GatewayError>),
    LeadDeleted {
        id: LeadId,
        result: Result<(), GatewayError>,
    },
    CsvExported {
        path: PathBuf,
        result: Result<usize, String>,
    },
}

impl Task {
    pub fn run<G: Gateway + ?Sized>(self, gateway: &G) -> TaskOutcome {
        match self {
            Self::LoadAudienceConfig => {
                TaskOutcome::AudienceConfigLoaded(gateway.fetch_audience_config())
            }
            Self::LoadHistory => TaskOutcome::HistoryLoaded(gateway.fetch_history()),
            Self::LoadSavedLeads => TaskOutcome::SavedLeadsLoaded(gateway.fetch_saved_leads()),
            Self::Search { ticket, params } => TaskOutcome::SearchFinished {
                ticket,
                result: gateway.submit_search(&params),
            },
            Self::SaveLead(lead) => TaskOutcome::LeadSaved(gateway.save_lead(&lead)),
            Self::DeleteLead(id) => {
                let result = gateway.delete_lead(&id);
                TaskOutcome::LeadDeleted { id, result }
            }
            Self::ExportCsv(path) => {
                let result = export_csv(gateway, &path).map_err(|error| format!("{error:#}"));
                TaskOutcome::CsvExported { path, result }
            }
        }
    }
}

fn export_csv<G: Gateway + ?Sized>(gateway: &G, path: &Path) -> Result<usize> {
    let bytes = gateway.export_csv()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(bytes.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    LoadingChanged(bool),
    ResultsReplaced { count: usize },
    HistoryRefreshed { count: usize },
    SavedLeadsRefreshed { count: usize },
    AudienceConfigChanged,
    DetailOpened,
    DetailClosed,
    ViewChanged(ActiveView),
    StaleSearchDiscarded { ticket: u64 },
    CsvExported { path: PathBuf, bytes: usize },
    Notice(Notice),
}

/// What a dispatch or an applied outcome produced: events for the renderer
/// and tasks still to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<AppEvent>,
    pub tasks: Vec<Task>,
}

impl Step {
    fn event(event: AppEvent) -> Self {
        Self {
            events: vec![event],
            tasks: Vec::new(),
        }
    }

    fn task(task: Task) -> Self {
        Self {
            events: Vec::new(),
            tasks: vec![task],
        }
    }

    fn notice(notice: Notice) -> Self {
        Self::event(AppEvent::Notice(notice))
    }
}

/// Owns the [`ViewState`] and is the only writer to it.
#[derive(Debug, Default)]
pub struct Coordinator {
    state: ViewState,
    issued_ticket: u64,
    pending_searches: usize,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn is_lead_saved(&self, id: &LeadId) -> bool {
        self.state.is_lead_saved(id)
    }

    pub fn dispatch(&mut self, intent: Intent) -> Step {
        debug!(?intent, "dispatch");
        match intent {
            Intent::Start => Step {
                events: Vec::new(),
                tasks: vec![
                    Task::LoadAudienceConfig,
                    Task::LoadHistory,
                    Task::LoadSavedLeads,
                ],
            },
            Intent::SubmitSearch(params) => self.begin_search(params),
            Intent::ReplayHistory(entry) => self.begin_search(entry.replay_params()),
            Intent::SelectLead(lead) => {
                self.state.selected_lead = Some(lead);
                Step::event(AppEvent::DetailOpened)
            }
            Intent::SaveLead(lead) => {
                if let Some(id) = &lead.id
                    && self.state.is_lead_saved(id)
                {
                    return Step::notice(Notice::info("Lead is already saved"));
                }
                Step::task(Task::SaveLead(lead))
            }
            Intent::DeleteLead(id) => {
                if !self.state.is_lead_saved(&id) {
                    return Step::notice(Notice::warning(format!(
                        "lead {id} is not in the saved list"
                    )));
                }
                Step::task(Task::DeleteLead(id))
            }
            Intent::CloseDetail => {
                self.state.selected_lead = None;
                Step::event(AppEvent::DetailClosed)
            }
            Intent::SwitchView(view) => {
                self.state.active_view = view;
                Step::event(AppEvent::ViewChanged(view))
            }
            Intent::DownloadCsv(path) => Step::task(Task::ExportCsv(path)),
        }
    }

    pub fn apply(&mut self, outcome: TaskOutcome) -> Step {
        match outcome {
            TaskOutcome::AudienceConfigLoaded(Ok(config)) => {
                self.state.audience_config = config;
                Step::event(AppEvent::AudienceConfigChanged)
            }
            TaskOutcome::AudienceConfigLoaded(Err(error)) => {
                warn!(%error, "load audience config");
                Step::default()
            }
            TaskOutcome::HistoryLoaded(Ok(history)) => {
                let count = history.len();
                self.state.history = history;
                Step::event(AppEvent::HistoryRefreshed { count })
            }
            TaskOutcome::HistoryLoaded(Err(error)) => {
                warn!(%error, "load history");
                Step::default()
            }
            TaskOutcome::SavedLeadsLoaded(Ok(leads)) => {
                let count = leads.len();
                self.state.saved_leads = leads;
                Step::event(AppEvent::SavedLeadsRefreshed { count })
            }
            TaskOutcome::SavedLeadsLoaded(Err(error)) => {
                warn!(%error, "load saved leads");
                Step::default()
            }
            TaskOutcome::SearchFinished { ticket, result } => self.finish_search(ticket, result),
            TaskOutcome::LeadSaved(Ok(())) => Step {
                events: vec![AppEvent::Notice(Notice::info("Lead saved successfully!"))],
                tasks: vec![Task::LoadSavedLeads],
            },
            TaskOutcome::LeadSaved(Err(error)) => {
                error!(%error, "save lead");
                Step::notice(Notice::error(format!("Failed to save lead: {error}")))
            }
            TaskOutcome::LeadDeleted { id, result: Ok(()) } => {
                let mut events = Vec::new();
                if self.state.selected_id() == Some(&id) {
                    self.state.selected_lead = None;
                    events.push(AppEvent::DetailClosed);
                }
                Step {
                    events,
                    tasks: vec![Task::LoadSavedLeads],
                }
            }
            TaskOutcome::LeadDeleted {
                id,
                result: Err(error),
            } => {
                error!(%error, %id, "delete lead");
                Step::notice(Notice::error(format!("Failed to delete lead: {error}")))
            }
            TaskOutcome::CsvExported {
                path,
                result: Ok(bytes),
            } => Step {
                events: vec![
                    AppEvent::Notice(Notice::info(format!("saved {}", path.display()))),
                    AppEvent::CsvExported { path, bytes },
                ],
                tasks: Vec::new(),
            },
            TaskOutcome::CsvExported {
                path,
                result: Err(error),
            } => {
                error!(%error, path = %path.display(), "export csv");
                Step::notice(Notice::error(format!("Failed to download CSV: {error}")))
            }
        }
    }

    /// Runs an intent and every follow-up task on the calling thread.
    pub fn run_blocking<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        intent: Intent,
    ) -> Vec<AppEvent> {
        let step = self.dispatch(intent);
        self.drain_blocking(gateway, step)
    }

    pub fn drain_blocking<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        step: Step,
    ) -> Vec<AppEvent> {
        let mut events = step.events;
        let mut queue = VecDeque::from(step.tasks);
        while let Some(task) = queue.pop_front() {
            let outcome = task.run(gateway);
            let step = self.apply(outcome);
            events.extend(step.events);
            queue.extend(step.tasks);
        }
        events
    }

    fn begin_search(&mut self, params: SearchParams) -> Step {
        if let Err(error) = params.validate() {
            return Step::notice(Notice::warning(error.to_string()));
        }

        self.issued_ticket += 1;
        self.pending_searches += 1;
        let ticket = self.issued_ticket;
        debug!(ticket, keyword = %params.keyword, platform = params.platform.as_str(), "search issued");

        let mut events = Vec::new();
        if !self.state.loading {
            self.state.loading = true;
            events.push(AppEvent::LoadingChanged(true));
        }
        Step {
            events,
            tasks: vec![Task::Search { ticket, params }],
        }
    }

    fn finish_search(&mut self, ticket: u64, result: Result<Vec<Lead>, GatewayError>) -> Step {
        self.pending_searches = self.pending_searches.saturating_sub(1);

        let mut step = if ticket < self.issued_ticket {
            debug!(ticket, newest = self.issued_ticket, "discarding stale search");
            Step::event(AppEvent::StaleSearchDiscarded { ticket })
        } else {
            match result {
                Ok(results) => {
                    let count = results.len();
                    self.state.results = results;
                    self.state.active_view = ActiveView::Search;
                    Step {
                        events: vec![
                            AppEvent::ResultsReplaced { count },
                            AppEvent::ViewChanged(ActiveView::Search),
                        ],
                        tasks: vec![Task::LoadHistory],
                    }
                }
                Err(error) => {
                    error!(%error, ticket, "search failed");
                    Step::notice(Notice::error(format!("Search failed: {error}")))
                }
            }
        };

        if self.pending_searches == 0 && self.state.loading {
            self.state.loading = false;
            step.events.push(AppEvent::LoadingChanged(false));
        }
        step
    }
}
