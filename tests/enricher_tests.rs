use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use search_skill::api::models::WebApiRequest;
use search_skill::data_models::{InputRecord, InputRecordData, OutputRecordData, SearchEntity};
use search_skill::enricher::{BatchEnricher, RecordOutcome};
use search_skill::error::{SearchError, ValidationError};
use search_skill::search::EntitySearch;

mod test_helpers {
    use super::*;

    /// Returns one entity named after the query, except for names starting
    /// with "fail" which produce a network error. Records every query.
    #[derive(Default)]
    pub struct StubSearch {
        pub queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EntitySearch for StubSearch {
        async fn search_entity(&self, entity_name: &str) -> Result<OutputRecordData, SearchError> {
            self.queries.lock().unwrap().push(entity_name.to_string());
            if entity_name.starts_with("fail") {
                return Err(SearchError::Network(format!("connection reset for {entity_name}")));
            }
            Ok(OutputRecordData {
                data_entities: vec![SearchEntity {
                    name: format!("{entity_name} Corp"),
                    display_url: "example.com".to_string(),
                    snippet: "snippet".to_string(),
                }],
            })
        }
    }

    /// Never completes on its own.
    pub struct HangingSearch;

    #[async_trait]
    impl EntitySearch for HangingSearch {
        async fn search_entity(&self, _entity_name: &str) -> Result<OutputRecordData, SearchError> {
            std::future::pending().await
        }
    }

    pub fn enricher_with_stub() -> (BatchEnricher, Arc<StubSearch>) {
        let stub = Arc::new(StubSearch::default());
        (BatchEnricher::new(stub.clone()), stub)
    }

    pub fn request(values: Vec<Option<InputRecord>>) -> Option<WebApiRequest> {
        Some(WebApiRequest {
            values: Some(values),
        })
    }
}

use test_helpers::*;

#[test]
fn test_validate_rejects_missing_request_and_values() {
    assert_eq!(
        BatchEnricher::validate(None).unwrap_err(),
        ValidationError::SchemaMismatch
    );
    assert_eq!(
        BatchEnricher::validate(Some(WebApiRequest { values: None })).unwrap_err(),
        ValidationError::MissingValues
    );
    assert!(BatchEnricher::validate(request(vec![])).unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_batch_yields_empty_output() {
    let (enricher, stub) = enricher_with_stub();
    let response = enricher
        .process(request(vec![]), &CancellationToken::new())
        .await
        .unwrap();
    assert!(response.values.is_empty());
    assert!(stub.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_successful_record_has_data_and_no_errors() {
    let (enricher, stub) = enricher_with_stub();
    let response = enricher
        .process(
            request(vec![Some(InputRecord::new("1", "Acme"))]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.values.len(), 1);
    let record = &response.values[0];
    assert_eq!(record.record_id, "1");
    assert!(record.errors.is_none());
    assert!(record.warnings.is_none());
    let data = record.data.as_ref().unwrap();
    assert_eq!(data.data_entities[0].name, "Acme Corp");
    assert_eq!(*stub.queries.lock().unwrap(), vec!["Acme".to_string()]);
}

#[tokio::test]
async fn test_failed_record_does_not_abort_batch() {
    let (enricher, _stub) = enricher_with_stub();
    let response = enricher
        .process(
            request(vec![
                Some(InputRecord::new("1", "Acme")),
                Some(InputRecord::new("2", "fail-me")),
                Some(InputRecord::new("3", "Globex")),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let ids: Vec<&str> = response.values.iter().map(|r| r.record_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let failed = &response.values[1];
    assert!(failed.data.is_none());
    let errors = failed.errors.as_ref().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "network error: connection reset for fail-me");

    assert!(response.values[0].data.is_some());
    assert_eq!(
        response.values[2].data.as_ref().unwrap().data_entities[0].name,
        "Globex Corp"
    );
}

// Records that are null or carry no id are dropped from the output rather
// than reported as errors. Change this test if that policy changes.
#[tokio::test]
async fn test_null_records_and_ids_are_skipped_silently() {
    let (enricher, stub) = enricher_with_stub();
    let no_id = InputRecord {
        record_id: None,
        data: Some(InputRecordData {
            name: Some("Ghost".to_string()),
        }),
    };
    let response = enricher
        .process(
            request(vec![
                None,
                Some(InputRecord::new("a", "Acme")),
                Some(no_id),
                Some(InputRecord::new("b", "Globex")),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let ids: Vec<&str> = response.values.iter().map(|r| r.record_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(
        *stub.queries.lock().unwrap(),
        vec!["Acme".to_string(), "Globex".to_string()]
    );
}

#[tokio::test]
async fn test_missing_data_fails_record_and_missing_name_searches_empty() {
    let (enricher, stub) = enricher_with_stub();
    let no_data = InputRecord {
        record_id: Some("1".to_string()),
        data: None,
    };
    let no_name = InputRecord {
        record_id: Some("2".to_string()),
        data: Some(InputRecordData { name: None }),
    };
    let response = enricher
        .process(
            request(vec![Some(no_data), Some(no_name)]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.values.len(), 2);
    let errors = response.values[0].errors.as_ref().unwrap();
    assert_eq!(errors[0].message, "record has no data object");
    assert!(response.values[1].data.is_some());
    assert_eq!(*stub.queries.lock().unwrap(), vec![String::new()]);
}

#[tokio::test]
async fn test_cancelled_batch_reports_each_record() {
    let enricher = BatchEnricher::new(Arc::new(HangingSearch));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = enricher
        .process(
            request(vec![
                Some(InputRecord::new("1", "Acme")),
                Some(InputRecord::new("2", "Globex")),
            ]),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(response.values.len(), 2);
    for record in &response.values {
        assert!(record.data.is_none());
        assert_eq!(
            record.errors.as_ref().unwrap()[0].message,
            "search request cancelled"
        );
    }
}

#[tokio::test]
async fn test_cancel_interrupts_in_flight_search() {
    let enricher = BatchEnricher::new(Arc::new(HangingSearch));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = enricher
        .enrich_record(&InputRecord::new("1", "Acme"), &cancel)
        .await;
    assert_eq!(
        outcome,
        RecordOutcome::Failed("search request cancelled".to_string())
    );
}

#[test]
fn test_input_record_decoding_is_lenient() {
    let request: WebApiRequest = serde_json::from_str(
        r#"{"values":[
            {"recordId":7,"data":{"name":"Acme"}},
            {"recordId":"x","data":"oops"},
            {"recordId":[1],"data":{"name":null}}
        ]}"#,
    )
    .unwrap();
    let values = request.values.unwrap();

    assert_eq!(values[0], Some(InputRecord::new("7", "Acme")));
    assert_eq!(values[1].as_ref().unwrap().record_id.as_deref(), Some("x"));
    assert!(values[1].as_ref().unwrap().data.is_none());
    assert!(values[2].as_ref().unwrap().record_id.is_none());
    assert_eq!(
        values[2].as_ref().unwrap().data,
        Some(InputRecordData { name: None })
    );
}
