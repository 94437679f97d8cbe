// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ActiveView, AudienceConfig, HistoryEntry, Lead, LeadId};

/// Single source of truth shared by every view. Only the coordinator writes
/// to it; renderers get a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub results: Vec<Lead>,
    pub selected_lead: Option<Lead>,
    pub history: Vec<HistoryEntry>,
    pub saved_leads: Vec<Lead>,
    pub loading: bool,
    pub active_view: ActiveView,
    pub audience_config: Option<AudienceConfig>,
}

impl ViewState {
    /// Linear scan over the saved list on every call; the list is small and
    /// replaced wholesale on each refresh.
    pub fn is_lead_saved(&self, id: &LeadId) -> bool {
        self.saved_leads
            .iter()
            .any(|lead| lead.id.as_ref() == Some(id))
    }

    pub fn selected_id(&self) -> Option<&LeadId> {
        self.selected_lead.as_ref().and_then(|lead| lead.id.as_ref())
    }

    /// The view `delta` steps away from the active one, wrapping at both ends.
    pub fn rotated_view(&self, delta: isize) -> ActiveView {
        let views = ActiveView::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        views[next]
    }
}
