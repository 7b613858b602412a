//! Subgraph GraphQL Client
//!
//! Thin HTTP client for The Graph style endpoints. Each request is sent
//! exactly once; failures go straight back to the caller.

use std::time::Duration;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::InvocationContext;
use crate::ports::ProviderError;

/// Default number of entities requested per page
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Subgraph client configuration
#[derive(Debug, Clone)]
pub struct SubgraphConfig {
    pub url: String,
    pub page_size: usize,
    pub timeout: Duration,
}

impl SubgraphConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Entity that can be paged through with an `id_gt` cursor
pub trait SubgraphEntity: DeserializeOwned {
    fn id(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

#[derive(Debug, Clone)]
pub struct SubgraphClient {
    url: Url,
    page_size: usize,
    http: Client,
}

impl SubgraphClient {
    pub fn new(config: SubgraphConfig) -> Result<Self, ProviderError> {
        let url = Url::parse(&config.url).map_err(|e| {
            ProviderError::HttpError(format!("Invalid subgraph URL '{}': {}", config.url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url,
            page_size: config.page_size.max(1),
            http,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Send one query and return the `data` object, if any
    pub async fn query(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<Option<Map<String, Value>>, ProviderError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }

    /// Fetch every entity under `field`, following the `id_gt` cursor until
    /// a short page comes back. `query` must accept `$pageSize: Int!` and
    /// `$lastId: String!`.
    ///
    /// Returns `None` if the very first page carries no data.
    pub async fn fetch_all<T: SubgraphEntity>(
        &self,
        ctx: &InvocationContext,
        query: &str,
        field: &str,
    ) -> Result<Option<Vec<T>>, ProviderError> {
        let mut cursor: PageCursor<T> = PageCursor::new(field, self.page_size);

        while !cursor.is_done() {
            let data = self.query(query, cursor.variables()).await?;
            let batch_len = cursor.accept(data)?;

            tracing::debug!(
                parent: ctx.span(),
                page = cursor.pages(),
                batch = batch_len,
                total = cursor.len(),
                "Fetched subgraph page"
            );
        }

        Ok(cursor.finish())
    }
}

/// Paging state for one `fetch_all` call
///
/// A missing `data` object on the first page means the subgraph has nothing
/// to report. On any later page it means the listing was cut short, which is
/// an error: returning what was gathered so far would cache a truncated
/// snapshot.
#[derive(Debug)]
struct PageCursor<T> {
    field: String,
    page_size: usize,
    last_id: String,
    pages: usize,
    entities: Vec<T>,
    absent: bool,
    done: bool,
}

impl<T: SubgraphEntity> PageCursor<T> {
    fn new(field: &str, page_size: usize) -> Self {
        Self {
            field: field.to_string(),
            page_size: page_size.max(1),
            last_id: String::new(),
            pages: 0,
            entities: Vec::new(),
            absent: false,
            done: false,
        }
    }

    fn variables(&self) -> Value {
        json!({ "pageSize": self.page_size, "lastId": self.last_id })
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn pages(&self) -> usize {
        self.pages
    }

    fn len(&self) -> usize {
        self.entities.len()
    }

    /// Consume one page; returns the number of entities it carried
    fn accept(&mut self, data: Option<Map<String, Value>>) -> Result<usize, ProviderError> {
        let Some(mut data) = data else {
            if self.pages == 0 {
                self.absent = true;
                self.done = true;
                return Ok(0);
            }
            return Err(ProviderError::DecodeError(format!(
                "page {} returned no data",
                self.pages + 1
            )));
        };

        let batch: Vec<T> = match data.remove(&self.field) {
            Some(value) => serde_json::from_value(value)?,
            None => {
                return Err(ProviderError::DecodeError(format!(
                    "response is missing field '{}'",
                    self.field
                )))
            }
        };

        let batch_len = batch.len();
        if let Some(last) = batch.last() {
            self.last_id = last.id().to_string();
        }
        self.entities.extend(batch);
        self.pages += 1;

        if batch_len < self.page_size {
            self.done = true;
        }
        Ok(batch_len)
    }

    fn finish(self) -> Option<Vec<T>> {
        if self.absent {
            None
        } else {
            Some(self.entities)
        }
    }
}

fn parse_response(body: &[u8]) -> Result<Option<Map<String, Value>>, ProviderError> {
    let response: GraphQlResponse = serde_json::from_slice(body)?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ProviderError::GraphQlError(messages.join("; ")));
    }

    Ok(response.data)
}

/// Subgraph decimals arrive as strings, e.g. `"1234.5678"`
pub fn parse_decimal(field: &str, value: &str) -> Result<f64, ProviderError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ProviderError::DecodeError(format!("{} '{}' is not a number: {}", field, value, e)))
        .and_then(|parsed| {
            if parsed.is_finite() {
                Ok(parsed)
            } else {
                Err(ProviderError::DecodeError(format!("{} '{}' is not finite", field, value)))
            }
        })
}
