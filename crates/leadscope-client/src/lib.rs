// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use leadscope_app::{
    AudienceConfig, Gateway, GatewayError, HistoryEntry, Lead, LeadId, SearchParams,
    check_envelope, decode_audience_config_response, decode_history_response,
    decode_saved_leads_response, decode_search_response, lead_to_wire,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking HTTP gateway to the lead backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Option<Duration>,
    http: HttpClient,
}

impl Client {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("server.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} cannot be used as a base URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Base URL joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json(&self, segments: &[&str]) -> Result<Value, GatewayError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        read_json(response, &url)
    }

    fn send_json(&self, request: RequestBuilder, url: &Url) -> Result<Value, GatewayError> {
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        read_json(response, url)
    }
}

impl Gateway for Client {
    fn submit_search(&self, params: &SearchParams) -> Result<Vec<Lead>, GatewayError> {
        let url = self.endpoint(&["scrape"]);
        debug!(%url, keyword = %params.keyword, platform = params.platform.as_str(), "POST");
        let body = self.send_json(self.http.post(url.clone()).json(params), &url)?;
        decode_search_response(&body)
    }

    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GatewayError> {
        let body = self.get_json(&["history"])?;
        Ok(decode_history_response(&body))
    }

    fn fetch_saved_leads(&self) -> Result<Vec<Lead>, GatewayError> {
        let body = self.get_json(&["leads"])?;
        Ok(decode_saved_leads_response(&body))
    }

    fn fetch_audience_config(&self) -> Result<Option<AudienceConfig>, GatewayError> {
        let body = self.get_json(&["api", "config", "audience"])?;
        Ok(decode_audience_config_response(&body))
    }

    fn save_lead(&self, lead: &Lead) -> Result<(), GatewayError> {
        let url = self.endpoint(&["leads"]);
        debug!(%url, id = ?lead.id, "POST");
        let body = self.send_json(self.http.post(url.clone()).json(&lead_to_wire(lead)), &url)?;
        check_envelope(&body)
    }

    fn delete_lead(&self, id: &LeadId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["leads", id.as_str()]);
        debug!(%url, "DELETE");
        let body = self.send_json(self.http.delete(url.clone()), &url)?;
        check_envelope(&body)
    }

    fn export_csv(&self) -> Result<Vec<u8>, GatewayError> {
        let url = self.endpoint(&["download-csv"]);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        let bytes = response
            .bytes()
            .map_err(|error| GatewayError::Transport(format!("read {url}: {error}")))?;
        Ok(bytes.to_vec())
    }
}

fn read_json(response: Response, url: &Url) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|error| GatewayError::Transport(format!("read {url}: {error}")))?;

    let body = match serde_json::from_str::<Value>(&text) {
        Ok(body) => body,
        Err(_) if !status.is_success() => return Err(clean_error_response(status, &text)),
        Err(error) => {
            return Err(GatewayError::Transport(format!(
                "decode response from {url}: {error}"
            )));
        }
    };

    // Envelope responses carry their own status; anything else that failed
    // at the HTTP level is an application error.
    if !status.is_success() && body.get("status").is_none() {
        return Err(clean_error_response(status, &text));
    }
    Ok(body)
}

fn connection_error(base_url: &str, error: reqwest::Error) -> GatewayError {
    GatewayError::Transport(format!(
        "cannot reach {base_url} -- check server.base_url or start the backend ({error})"
    ))
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<Value>,
}

fn clean_error_response(status: StatusCode, body: &str) -> GatewayError {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
    {
        let detail = match detail {
            Value::String(text) => text,
            other => other.to_string(),
        };
        if !detail.trim().is_empty() {
            return GatewayError::Application(detail);
        }
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return GatewayError::Application(format!("server error ({}): {body}", status.as_u16()));
    }

    GatewayError::Application(format!("server returned {}", status.as_u16()))
}
