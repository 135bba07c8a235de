//! Airtable REST backend for `LeadStore`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::crm::{
    compute_stats, CrmError, LeadRecordFields, LeadStats, LeadStore, LeadUpdate, ListFilter,
    StoredLead,
};

const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0/";
/// Airtable's maximum page size for list requests.
const PAGE_SIZE: usize = 100;
const CREATED_AT_FIELD: &str = "Created At";
/// Upper bound on any single Airtable request, connect included.
pub const CRM_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    fields: &'a LeadRecordFields,
}

#[derive(Debug, Serialize)]
struct UpdateRecordRequest<'a> {
    fields: UpdateFields<'a>,
}

#[derive(Debug, Serialize)]
struct UpdateFields<'a> {
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(rename = "Assigned To", skip_serializing_if = "Option::is_none")]
    assigned_to: Option<&'a str>,
}

impl<'a> From<&'a LeadUpdate> for UpdateFields<'a> {
    fn from(update: &'a LeadUpdate) -> Self {
        Self {
            status: update.status.as_deref(),
            assigned_to: update.assigned_to.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(rename = "createdTime")]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    fields: LeadRecordFields,
}

impl From<AirtableRecord> for StoredLead {
    fn from(record: AirtableRecord) -> Self {
        StoredLead {
            id: record.id,
            created_at: record.created_time,
            fields: record.fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

#[derive(Clone)]
pub struct AirtableStore {
    client: Client,
    api_key: String,
    table_url: Url,
}

impl AirtableStore {
    pub fn new(api_key: String, base_id: &str, table_name: &str) -> Result<Self, CrmError> {
        Self::with_timeout(api_key, base_id, table_name, CRM_HTTP_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: String,
        base_id: &str,
        table_name: &str,
        timeout: Duration,
    ) -> Result<Self, CrmError> {
        Ok(Self {
            client: Client::builder()
                .connect_timeout(timeout)
                .timeout(timeout)
                .build()?,
            api_key,
            table_url: table_url(base_id, table_name)?,
        })
    }

    fn record_url(&self, id: &str) -> Result<Url, CrmError> {
        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|_| CrmError::Config("table URL cannot be a base".to_string()))?
            .push(id);
        Ok(url)
    }

    /// Follows Airtable's `offset` cursor until `max_records` rows (or all rows) are read.
    async fn fetch_all(
        &self,
        filter_formula: Option<String>,
        max_records: Option<usize>,
    ) -> Result<Vec<AirtableRecord>, CrmError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let query = list_query(filter_formula.as_deref(), max_records, offset.as_deref());
            let response = self
                .client
                .get(self.table_url.clone())
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await?;
            let page: ListRecordsResponse = ensure_success(response).await?.json().await?;

            records.extend(page.records);
            debug!("Fetched {} Airtable records so far", records.len());

            let reached_limit = max_records.is_some_and(|max| records.len() >= max);
            match page.offset {
                Some(next) if !reached_limit => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = max_records {
            records.truncate(max);
        }
        Ok(records)
    }
}

#[async_trait]
impl LeadStore for AirtableStore {
    fn backend_name(&self) -> &'static str {
        "airtable"
    }

    async fn create_record(&self, fields: &LeadRecordFields) -> Result<String, CrmError> {
        let response = self
            .client
            .post(self.table_url.clone())
            .bearer_auth(&self.api_key)
            .json(&CreateRecordRequest { fields })
            .send()
            .await?;
        let record: AirtableRecord = ensure_success(response).await?.json().await?;

        info!("Lead created in Airtable: {} (ID: {})", fields.name, record.id);
        Ok(record.id)
    }

    async fn get_record(&self, id: &str) -> Result<Option<StoredLead>, CrmError> {
        let response = self
            .client
            .get(self.record_url(id)?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: AirtableRecord = ensure_success(response).await?.json().await?;
        Ok(Some(record.into()))
    }

    async fn update_record(
        &self,
        id: &str,
        update: &LeadUpdate,
    ) -> Result<Option<StoredLead>, CrmError> {
        let response = self
            .client
            .patch(self.record_url(id)?)
            .bearer_auth(&self.api_key)
            .json(&UpdateRecordRequest {
                fields: update.into(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: AirtableRecord = ensure_success(response).await?.json().await?;

        info!("Lead updated in Airtable: {}", record.id);
        Ok(Some(record.into()))
    }

    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<StoredLead>, CrmError> {
        let formula = filter
            .priority
            .map(|p| format!("{{Priority}} = '{}'", p.as_str()));
        let records = self.fetch_all(formula, Some(filter.limit)).await?;

        info!("Retrieved {} leads from Airtable", records.len());
        Ok(records.into_iter().map(StoredLead::from).collect())
    }

    async fn aggregate(&self) -> Result<LeadStats, CrmError> {
        let records = self.fetch_all(None, None).await?;
        let fields: Vec<LeadRecordFields> = records.into_iter().map(|r| r.fields).collect();
        Ok(compute_stats(&fields))
    }
}

fn table_url(base_id: &str, table_name: &str) -> Result<Url, CrmError> {
    let mut url = Url::parse(AIRTABLE_API_URL).map_err(|e| CrmError::Config(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| CrmError::Config("Airtable API URL cannot be a base".to_string()))?
        .pop_if_empty()
        .push(base_id)
        .push(table_name);
    Ok(url)
}

fn list_query(
    filter_formula: Option<&str>,
    max_records: Option<usize>,
    offset: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("pageSize", PAGE_SIZE.to_string()),
        ("sort[0][field]", CREATED_AT_FIELD.to_string()),
        ("sort[0][direction]", "desc".to_string()),
    ];
    if let Some(max) = max_records {
        query.push(("maxRecords", max.to_string()));
    }
    if let Some(formula) = filter_formula {
        query.push(("filterByFormula", formula.to_string()));
    }
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
    query
}

async fn ensure_success(response: Response) -> Result<Response, CrmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CrmError::Api {
        status: status.as_u16(),
        message,
    })
}
