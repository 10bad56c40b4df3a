use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::models::{WebApiRequest, WebApiResponse};
use crate::data_models::{InputRecord, OutputRecord, OutputRecordData};
use crate::error::{SearchError, ValidationError};
use crate::search::EntitySearch;

/// Result of enriching one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Enriched(OutputRecordData),
    Failed(String),
}

impl From<Result<OutputRecordData, SearchError>> for RecordOutcome {
    fn from(result: Result<OutputRecordData, SearchError>) -> Self {
        match result {
            Ok(data) => RecordOutcome::Enriched(data),
            Err(e) => RecordOutcome::Failed(e.to_string()),
        }
    }
}

/// Runs one search per record, sequentially, and collects the results in
/// input order.
pub struct BatchEnricher {
    search: Arc<dyn EntitySearch>,
}

impl BatchEnricher {
    pub fn new(search: Arc<dyn EntitySearch>) -> Self {
        Self { search }
    }

    /// Request-level checks. `None` is a body that decoded to `null`.
    pub fn validate(
        request: Option<WebApiRequest>,
    ) -> Result<Vec<Option<InputRecord>>, ValidationError> {
        let request = request.ok_or(ValidationError::SchemaMismatch)?;
        request.values.ok_or(ValidationError::MissingValues)
    }

    pub async fn process(
        &self,
        request: Option<WebApiRequest>,
        cancel: &CancellationToken,
    ) -> Result<WebApiResponse, ValidationError> {
        let records = Self::validate(request)?;
        info!(records = records.len(), "starting batch");

        let mut values = Vec::with_capacity(records.len());
        for record in records.iter().flatten() {
            // Records without an id are dropped from the output entirely.
            let Some(record_id) = record.record_id.clone() else {
                continue;
            };

            let output = match self.enrich_record(record, cancel).await {
                RecordOutcome::Enriched(data) => {
                    info!(
                        record_id = %record_id,
                        entities = data.data_entities.len(),
                        "record enriched"
                    );
                    OutputRecord::enriched(record_id, data)
                }
                RecordOutcome::Failed(message) => {
                    error!(record_id = %record_id, error = %message, "record failed");
                    OutputRecord::failed(record_id, message)
                }
            };
            values.push(output);
        }

        Ok(WebApiResponse { values })
    }

    pub async fn enrich_record(
        &self,
        record: &InputRecord,
        cancel: &CancellationToken,
    ) -> RecordOutcome {
        let Some(data) = record.data.as_ref() else {
            return RecordOutcome::Failed(SearchError::MissingData.to_string());
        };
        let entity_name = data.name.as_deref().unwrap_or_default();

        if cancel.is_cancelled() {
            return RecordOutcome::Failed(SearchError::Cancelled.to_string());
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            res = self.search.search_entity(entity_name) => res,
        };
        result.into()
    }
}
