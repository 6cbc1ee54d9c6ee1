//! Streaming helper for iterating the Qdrant scroll endpoint without manual loops.

use async_stream::try_stream;
use futures_core::Stream;
use reqwest::Method;
use serde_json::{Map, Value, json};

use super::client::QdrantService;
use super::types::{QdrantError, ScrollResponse};

const DEFAULT_SCROLL_LIMIT: usize = 512;

/// Stream Qdrant payloads for a collection using the scroll API.
pub fn stream_payloads<'a>(
    service: &'a QdrantService,
    collection: &'a str,
    with_payload: Value,
    filter: Option<Value>,
) -> impl Stream<Item = Result<Map<String, Value>, QdrantError>> + 'a {
    try_stream! {
        let mut offset = Value::Null;
        let filter_body = filter.unwrap_or_else(|| json!({ "must": [] }));

        loop {
            let body = json!({
                "with_payload": with_payload.clone(),
                "with_vector": false,
                "limit": DEFAULT_SCROLL_LIMIT,
                "filter": filter_body.clone(),
                "offset": offset.clone(),
            });

            let response = service
                .request(Method::POST, &format!("collections/{collection}/points/scroll"))
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let ScrollResponse { result } = response.json().await?;
                for point in result.points {
                    if let Some(payload) = point.payload {
                        yield payload;
                    }
                }

                match result.next_page_offset {
                    Some(next) if !next.is_null() => offset = next,
                    _ => break,
                }
            } else {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(collection, status = %status, "Failed to scroll payloads");
                Err(QdrantError::UnexpectedStatus { status, body })?;
            }
        }
    }
}
