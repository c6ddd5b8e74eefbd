use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::context::RequestContext;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::types::{AppError, AppResult};

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct SbiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl SbiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<Option<T>> {
        if self.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| AppError::internal("Failed to decode response").with_cause(e))
    }
}

#[derive(Clone)]
pub struct SbiClient {
    http: Client,
    service_name: String,
    timeout: Duration,
    metrics: Arc<dyn MetricsSink>,
}

impl SbiClient {
    pub fn new(service_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            service_name: service_name.into(),
            timeout,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    pub async fn get<T>(&self, ctx: &RequestContext, url: &str) -> AppResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.request::<()>(ctx, Method::GET, url, None).await?.json()
    }

    pub async fn post<B, T>(&self, ctx: &RequestContext, url: &str, body: &B) -> AppResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, Method::POST, url, Some(body)).await?.json()
    }

    pub async fn put<B, T>(&self, ctx: &RequestContext, url: &str, body: &B) -> AppResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, Method::PUT, url, Some(body)).await?.json()
    }

    pub async fn delete(&self, ctx: &RequestContext, url: &str) -> AppResult<()> {
        self.request::<()>(ctx, Method::DELETE, url, None).await?;
        Ok(())
    }

    pub async fn request<B>(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> AppResult<SbiResponse>
    where
        B: Serialize + ?Sized,
    {
        let start = Instant::now();

        let payload = match body {
            Some(body) => Some(serde_json::to_vec(body).map_err(|e| {
                AppError::internal("Failed to marshal request body").with_cause(e)
            })?),
            None => None,
        };

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .timeout(self.timeout);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }
        let request = builder
            .build()
            .map_err(|e| AppError::internal("Failed to create request").with_cause(e))?;

        let outcome = tokio::select! {
            biased;
            reason = ctx.done() => Err(AppError::internal(format!("Failed to execute request to {}", url)).with_cause(reason)),
            result = self.http.execute(request) => result.map_err(|e| {
                AppError::internal(format!("Failed to execute request to {}", url)).with_cause(e)
            }),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.metrics
                    .increment_request_counter(&self.service_name, method.as_str(), "error");
                tracing::debug!(
                    service = %self.service_name,
                    method = %method,
                    url = %url,
                    status = "error",
                    duration = start.elapsed().as_secs_f64(),
                    error = %err,
                    "SBI request"
                );
                return Err(err);
            }
        };

        let status = response.status();
        let duration = start.elapsed().as_secs_f64();
        self.metrics
            .observe_request_duration(&self.service_name, method.as_str(), duration);
        self.metrics
            .increment_request_counter(&self.service_name, method.as_str(), status.as_str());

        tracing::debug!(
            service = %self.service_name,
            method = %method,
            url = %url,
            status = status.as_u16(),
            duration,
            "SBI request"
        );

        // The body download is still part of the attempt and honours the context.
        let read = tokio::select! {
            biased;
            reason = ctx.done() => {
                return Err(AppError::internal(format!("Failed to read response from {}", url)).with_cause(reason));
            }
            result = response.bytes() => result,
        };

        if status.as_u16() >= 400 {
            let message = read
                .ok()
                .as_deref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(AppError::from_status(status.as_u16(), message));
        }

        let body = read.map_err(|e| AppError::internal("Failed to read response body").with_cause(e))?;

        Ok(SbiResponse { status, body })
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    let fields: HashMap<String, serde_json::Value> = serde_json::from_slice(body).ok()?;
    match fields.get("message") {
        Some(serde_json::Value::String(message)) if !message.is_empty() => Some(message.clone()),
        _ => None,
    }
}
