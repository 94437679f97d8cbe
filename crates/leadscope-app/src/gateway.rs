// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The seam between the coordinator and the backend.
//!
//! Response bodies are decoded here, once, so every [`Gateway`] implementation
//! hands the coordinator normalized records and the same error taxonomy.

use serde_json::Value;

use crate::{
    AudienceConfig, HistoryEntry, Lead, LeadId, SearchParams, normalize_history, normalize_leads,
};

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request never completed, or its body could not be decoded.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("{0}")]
    Application(String),
}

pub trait Gateway {
    fn submit_search(&self, params: &SearchParams) -> Result<Vec<Lead>, GatewayError>;
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GatewayError>;
    fn fetch_saved_leads(&self) -> Result<Vec<Lead>, GatewayError>;
    fn fetch_audience_config(&self) -> Result<Option<AudienceConfig>, GatewayError>;
    fn save_lead(&self, lead: &Lead) -> Result<(), GatewayError>;
    fn delete_lead(&self, id: &LeadId) -> Result<(), GatewayError>;
    fn export_csv(&self) -> Result<Vec<u8>, GatewayError>;
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn submit_search(&self, params: &SearchParams) -> Result<Vec<Lead>, GatewayError> {
        (**self).submit_search(params)
    }

    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GatewayError> {
        (**self).fetch_history()
    }

    fn fetch_saved_leads(&self) -> Result<Vec<Lead>, GatewayError> {
        (**self).fetch_saved_leads()
    }

    fn fetch_audience_config(&self) -> Result<Option<AudienceConfig>, GatewayError> {
        (**self).fetch_audience_config()
    }

    fn save_lead(&self, lead: &Lead) -> Result<(), GatewayError> {
        (**self).save_lead(lead)
    }

    fn delete_lead(&self, id: &LeadId) -> Result<(), GatewayError> {
        (**self).delete_lead(id)
    }

    fn export_csv(&self) -> Result<Vec<u8>, GatewayError> {
        (**self).export_csv()
    }
}

/// `{status, detail?}` envelope check shared by search, save and delete.
pub fn check_envelope(body: &Value) -> Result<(), GatewayError> {
    if body.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(());
    }
    let detail = match body.get("detail") {
        None | Some(Value::Null) => UNKNOWN_ERROR.to_owned(),
        Some(Value::String(detail)) if detail.trim().is_empty() => UNKNOWN_ERROR.to_owned(),
        Some(Value::String(detail)) => detail.clone(),
        Some(other) => other.to_string(),
    };
    Err(GatewayError::Application(detail))
}

pub fn decode_search_response(body: &Value) -> Result<Vec<Lead>, GatewayError> {
    check_envelope(body)?;
    Ok(body.get("results").map(normalize_leads).unwrap_or_default())
}

pub fn decode_history_response(body: &Value) -> Vec<HistoryEntry> {
    body.get("history").map(normalize_history).unwrap_or_default()
}

pub fn decode_saved_leads_response(body: &Value) -> Vec<Lead> {
    body.get("leads").map(normalize_leads).unwrap_or_default()
}

pub fn decode_audience_config_response(body: &Value) -> Option<AudienceConfig> {
    match body.get("data") {
        None | Some(Value::Null) => None,
        Some(data) => Some(AudienceConfig { raw: data.clone() }),
    }
}
