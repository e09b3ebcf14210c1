//! Implements the `Storage` trait against a REST server using `reqwest`.

use crate::api::Storage;
use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::model::{Month, NewTransaction, Transaction, TransactionId};
use crate::Result;
use anyhow::{anyhow, Context};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Talks to a server exposing:
/// - `GET /transactions/{YYYY-MM}` returning a JSON array of transactions
/// - `POST /transaction` taking `{type, amount, description, month}` and returning the stored
///   transaction
/// - `DELETE /transaction/{id}`
///
/// Any non-2xx status is a failure.
#[derive(Debug, Clone)]
pub struct HttpStorage {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStorage {
    /// Creates a client for the server at `base_url`. Requests that take longer than `timeout` fail.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")
            .pub_result(ErrorType::Config)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::new(
                ErrorType::Config,
                anyhow!("'{base_url}' cannot be used as a base URL"),
            ));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Res<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("'{}' cannot be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Storage for HttpStorage {
    async fn list(&self, month: Month) -> Result<Vec<Transaction>> {
        let url = self
            .endpoint(&["transactions", &month.to_string()])
            .pub_result(ErrorType::Config)?;
        trace!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request the transactions for {month}"))
            .pub_result(ErrorType::Backend)?;
        let response = check_status(response).await?;
        response
            .json::<Vec<Transaction>>()
            .await
            .with_context(|| format!("Failed to parse the transactions for {month}"))
            .pub_result(ErrorType::Backend)
    }

    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let url = self.endpoint(&["transaction"]).pub_result(ErrorType::Config)?;
        trace!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(&new_transaction)
            .send()
            .await
            .context("Failed to send the new transaction")
            .pub_result(ErrorType::Backend)?;
        let response = check_status(response).await?;
        response
            .json::<Transaction>()
            .await
            .context("Failed to parse the created transaction")
            .pub_result(ErrorType::Backend)
    }

    async fn delete(&self, id: &TransactionId) -> Result<()> {
        let url = self
            .endpoint(&["transaction", id.as_str()])
            .pub_result(ErrorType::Config)?;
        trace!("DELETE {url}");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .with_context(|| format!("Failed to request deletion of transaction {id}"))
            .pub_result(ErrorType::Backend)?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into an error. A 404 becomes `NotFound`, everything else `Backend`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    let error_type = if status == StatusCode::NOT_FOUND {
        ErrorType::NotFound
    } else {
        ErrorType::Backend
    };
    Err(Error::new(
        error_type,
        anyhow!("{url} responded with status {status}: {body}"),
    ))
}
