use crate::data_models::{OutputRecordData, SearchEntity, SearchHit};

/// Maps search hits to output entities, keeping order. `None` maps to an
/// empty list.
pub fn map_hits(hits: Option<&[SearchHit]>) -> Vec<SearchEntity> {
    hits.unwrap_or_default()
        .iter()
        .map(|hit| {
            tracing::debug!(
                name = %hit.name,
                url = %hit.url,
                date_last_crawled = ?hit.date_last_crawled,
                "search hit"
            );
            SearchEntity {
                name: hit.name.clone(),
                display_url: hit.display_url.clone(),
                snippet: hit.snippet.clone(),
            }
        })
        .collect()
}

pub fn to_record_data(hits: Option<&[SearchHit]>) -> OutputRecordData {
    OutputRecordData {
        data_entities: map_hits(hits),
    }
}
