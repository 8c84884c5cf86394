// src/upstream/bigquery.rs
//! GDELT events via the BigQuery REST `jobs.query` endpoint.
//!
//! Auth is a bearer token read from the credentials file (or
//! `BIGQUERY_ACCESS_TOKEN`); minting tokens from a service-account key is left
//! to whoever provisions that file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{EventQuery, EventSource};
use crate::error::UpstreamError;
use crate::model::RawEvent;

pub const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";
pub const ENV_ACCESS_TOKEN: &str = "BIGQUERY_ACCESS_TOKEN";
/// Used when neither config nor the credentials file names a project.
pub const DEFAULT_PROJECT: &str = "globev1";
const MAX_POLLS: u32 = 10;
const QUERY_TIMEOUT_MS: u64 = 30_000;

const EVENTS_SQL: &str = "SELECT GLOBALEVENTID, SQLDATE, GoldsteinScale, EventCode, AvgTone, \
Actor1Geo_Lat, Actor1Geo_Long, Actor1Geo_FullName, SourceURL \
FROM `gdelt-bq.gdeltv2.events` WHERE SQLDATE = @date";
const KEYWORD_FILTER: &str = " AND LOWER(SourceURL) LIKE CONCAT('%', LOWER(@keyword), '%')";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Credentials {
    /// Read the credentials file; the env token, when set, wins over the file's.
    pub fn load(path: &Path) -> Result<Self, UpstreamError> {
        let from_file = std::fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {e}", path.display()))
            .and_then(|raw| {
                serde_json::from_str::<Credentials>(&raw)
                    .map_err(|e| format!("parsing {}: {e}", path.display()))
            });
        let env_token = std::env::var(ENV_ACCESS_TOKEN).ok().filter(|t| !t.trim().is_empty());

        match (from_file, env_token) {
            (Ok(mut creds), Some(token)) => {
                creds.access_token = Some(token);
                Ok(creds)
            }
            (Ok(creds), None) if creds.access_token.is_some() => Ok(creds),
            (Ok(_), None) => Err(UpstreamError::Credentials(format!(
                "{} has no access_token and {ENV_ACCESS_TOKEN} is unset",
                path.display()
            ))),
            (Err(_), Some(token)) => Ok(Credentials {
                project_id: None,
                access_token: Some(token),
            }),
            (Err(e), None) => Err(UpstreamError::Credentials(e)),
        }
    }
}

pub struct BigQueryEventSource {
    client: Client,
    endpoint: String,
    credentials_path: PathBuf,
    project: Option<String>,
    location: String,
    limit: u32,
}

impl BigQueryEventSource {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials_path: credentials_path.into(),
            project: None,
            location: "US".to_string(),
            limit: 100,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the project named in the credentials file.
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    async fn post_query(
        &self,
        project: &str,
        token: &str,
        body: &Value,
    ) -> Result<QueryResponse, UpstreamError> {
        let url = format!("{}/projects/{project}/queries", self.endpoint);
        let resp = self.client.post(&url).bearer_auth(token).json(body).send().await?;
        decode_response(resp).await
    }

    async fn poll_results(
        &self,
        project: &str,
        token: &str,
        job_id: &str,
    ) -> Result<QueryResponse, UpstreamError> {
        let url = format!("{}/projects/{project}/queries/{job_id}", self.endpoint);
        let timeout_ms = QUERY_TIMEOUT_MS.to_string();
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("location", self.location.as_str()),
                ("timeoutMs", timeout_ms.as_str()),
            ])
            .send()
            .await?;
        decode_response(resp).await
    }
}

async fn decode_response(resp: reqwest::Response) -> Result<QueryResponse, UpstreamError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }
    resp.json::<QueryResponse>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// SQL text plus named parameters for one request.
pub fn build_query(query: &EventQuery, limit: u32, location: &str) -> Value {
    let mut sql = EVENTS_SQL.to_string();
    let mut params = vec![json!({
        "name": "date",
        "parameterType": {"type": "INT64"},
        "parameterValue": {"value": query.date_number().to_string()}
    })];
    if !query.keyword.is_empty() {
        sql.push_str(KEYWORD_FILTER);
        params.push(json!({
            "name": "keyword",
            "parameterType": {"type": "STRING"},
            "parameterValue": {"value": query.keyword}
        }));
    }
    sql.push_str(&format!(" LIMIT {limit}"));

    json!({
        "query": sql,
        "useLegacySql": false,
        "location": location,
        "timeoutMs": QUERY_TIMEOUT_MS,
        "parameterMode": "NAMED",
        "queryParameters": params,
    })
}

#[async_trait]
impl EventSource for BigQueryEventSource {
    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, UpstreamError> {
        let result = self.run(query).await;
        if let Err(e) = &result {
            counter!("upstream_query_errors_total").increment(1);
            tracing::error!(target: "upstream", source = self.name(), error = %e, "event query failed");
        }
        result
    }

    fn name(&self) -> &'static str {
        "bigquery"
    }
}

impl BigQueryEventSource {
    async fn run(&self, query: &EventQuery) -> Result<Vec<RawEvent>, UpstreamError> {
        tracing::info!(
            target: "upstream",
            credentials = %self.credentials_path.display(),
            "using credentials file"
        );
        let creds = Credentials::load(&self.credentials_path)?;
        let token = creds
            .access_token
            .clone()
            .ok_or_else(|| UpstreamError::Credentials("no access token".into()))?;
        let project = self
            .project
            .clone()
            .or(creds.project_id)
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());

        let body = build_query(query, self.limit, &self.location);
        let mut resp = self.post_query(&project, &token, &body).await?;

        let mut polls = 0;
        while !resp.job_complete {
            let job_id = resp
                .job_reference
                .as_ref()
                .map(|r| r.job_id.clone())
                .ok_or_else(|| UpstreamError::Decode("incomplete job without jobReference".into()))?;
            if polls >= MAX_POLLS {
                return Err(UpstreamError::JobIncomplete { job_id, polls });
            }
            polls += 1;
            tracing::debug!(target: "upstream", %job_id, polls, "waiting for query job");
            tokio::time::sleep(Duration::from_millis(250)).await;
            resp = self.poll_results(&project, &token, &job_id).await?;
        }

        let events = rows_to_events(&resp)?;
        tracing::info!(target: "upstream", rows = events.len(), date = %query.date_compact(), "event query finished");
        Ok(events)
    }
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Row {
    pub f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
pub struct Cell {
    pub v: Value,
}

/// Decode `rows[].f[].v` by column name into events.
pub fn rows_to_events(resp: &QueryResponse) -> Result<Vec<RawEvent>, UpstreamError> {
    let Some(schema) = &resp.schema else {
        return if resp.rows.is_empty() {
            Ok(Vec::new())
        } else {
            Err(UpstreamError::Decode("rows without schema".into()))
        };
    };
    let columns: HashMap<&str, usize> = schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();

    let cell = |row: &Row, name: &str| -> Option<String> {
        let idx = *columns.get(name)?;
        match &row.f.get(idx)?.v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    let num = |row: &Row, name: &str| cell(row, name).and_then(|s| s.parse::<f64>().ok());

    let mut out = Vec::with_capacity(resp.rows.len());
    for row in &resp.rows {
        let Some(id) = cell(row, "GLOBALEVENTID").and_then(|s| s.parse::<i64>().ok()) else {
            tracing::warn!(target: "upstream", "row without GLOBALEVENTID skipped");
            continue;
        };
        let tone = num(row, "AvgTone").unwrap_or_default();
        out.push(RawEvent {
            id,
            goldstein_scale: num(row, "GoldsteinScale").unwrap_or_default(),
            sentiment_score: tone,
            event_type: cell(row, "EventCode").unwrap_or_default(),
            tone,
            lat: num(row, "Actor1Geo_Lat"),
            lon: num(row, "Actor1Geo_Long"),
            location: cell(row, "Actor1Geo_FullName").filter(|s| !s.is_empty()),
            timestamp: cell(row, "SQLDATE")
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y%m%d").ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt)),
            source_url: cell(row, "SourceURL").filter(|s| !s.is_empty()),
        });
    }
    Ok(out)
}
