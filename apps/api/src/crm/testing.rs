//! In-memory `LeadStore` fakes for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::crm::{
    compute_stats, CrmError, LeadRecordFields, LeadStats, LeadStore, LeadUpdate, ListFilter,
    StoredLead,
};

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<StoredLead>>,
}

#[async_trait]
impl LeadStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_record(&self, fields: &LeadRecordFields) -> Result<String, CrmError> {
        let mut records = self.records.lock().unwrap();
        let id = format!("rec{}", records.len() + 1);
        records.push(StoredLead {
            id: id.clone(),
            created_at: Some(Utc::now()),
            fields: fields.clone(),
        });
        Ok(id)
    }

    async fn get_record(&self, id: &str) -> Result<Option<StoredLead>, CrmError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update_record(
        &self,
        id: &str,
        update: &LeadUpdate,
    ) -> Result<Option<StoredLead>, CrmError> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(status) = &update.status {
            record.fields.status = status.clone();
        }
        if let Some(assigned_to) = &update.assigned_to {
            record.fields.assigned_to = Some(assigned_to.clone());
        }
        Ok(Some(record.clone()))
    }

    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<StoredLead>, CrmError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| {
                filter
                    .priority
                    .map_or(true, |p| r.fields.priority == p.as_str())
            })
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn aggregate(&self) -> Result<LeadStats, CrmError> {
        let records = self.records.lock().unwrap();
        let fields: Vec<LeadRecordFields> = records.iter().map(|r| r.fields.clone()).collect();
        Ok(compute_stats(&fields))
    }
}

/// Every operation fails as if the CRM were down.
pub struct UnavailableStore;

fn unavailable() -> CrmError {
    CrmError::Api {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

#[async_trait]
impl LeadStore for UnavailableStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn create_record(&self, _fields: &LeadRecordFields) -> Result<String, CrmError> {
        Err(unavailable())
    }

    async fn get_record(&self, _id: &str) -> Result<Option<StoredLead>, CrmError> {
        Err(unavailable())
    }

    async fn update_record(
        &self,
        _id: &str,
        _update: &LeadUpdate,
    ) -> Result<Option<StoredLead>, CrmError> {
        Err(unavailable())
    }

    async fn list_records(&self, _filter: &ListFilter) -> Result<Vec<StoredLead>, CrmError> {
        Err(unavailable())
    }

    async fn aggregate(&self) -> Result<LeadStats, CrmError> {
        Err(unavailable())
    }
}
