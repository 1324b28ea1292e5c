//! HTTP transport shared by every service.
//!
//! All outbound calls go through [`ApiClient::execute`], which runs the
//! configured [`RequestInterceptor`]s on the built request before it is
//! sent. Failures are only logged at debug level here; the caller that
//! handles the error logs it.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::middleware::RequestInterceptor;

/// Longest response body excerpt kept in errors and logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Catalog API transport.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl ApiClient {
    /// Create a transport for `config.api_url`.
    ///
    /// Interceptors run in the given order on every request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        interceptors: Vec<Arc<dyn RequestInterceptor>>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                interceptors,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Start a request to `path`, relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `path` cannot be joined.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self.inner.client.request(method, url))
    }

    /// Build, intercept and send a request.
    ///
    /// Non-success statuses are turned into `ClientError::Status`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` on network failures and
    /// `ClientError::Status` when the server rejects the request.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = builder.build()?;
        for interceptor in &self.inner.interceptors {
            interceptor.intercept(&mut request);
        }

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "Sending request");

        let response = self.inner.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(ERROR_BODY_LIMIT)
            .collect::<String>();
        debug!(%method, %url, %status, body = %body, "API returned non-success status");
        Err(ClientError::Status { status, body })
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`]; also `ClientError::Parse` on bad JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        parse_json(response).await
    }

    /// `POST` a JSON body and parse the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(Method::POST, path)?.json(body))
            .await?;
        parse_json(response).await
    }

    /// `POST` a JSON body, ignoring whatever the server replies with.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await?;
        Ok(())
    }

    /// `PUT` a JSON body and parse the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(Method::PUT, path)?.json(body))
            .await?;
        parse_json(response).await
    }

    /// `DELETE` a resource. The reply body is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("interceptors", &self.inner.interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Read the body as text first so parse failures can be logged with it.
async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        debug!(
            error = %e,
            body = %text.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
            "Failed to parse API response"
        );
        ClientError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_joins_relative_path() {
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/prefix").unwrap();
        let api = ApiClient::new(&config, Vec::new()).unwrap();

        let request = api
            .request(Method::GET, "api/product/getproducts")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:9/prefix/api/product/getproducts"
        );
    }
}
