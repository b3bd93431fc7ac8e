//! reqwest implementation of `ResourceApi`
use crate::api::{
    Ack, ApiResult, Endpoint, RequestList, ResourceApi, ack_of, data_of, decode_envelope,
    uploaded_url_of,
};
use crate::auth::TokenSource;
use crate::completion::CompletionBody;
use crate::config::ClientConfig;
use crate::draft::CreateRequestBody;
use crate::error::ApiError;
use crate::request::ResourceRequest;
use crate::review::{ApprovalBody, RefetchOrder, Rejection};
use crate::status::RequestStats;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, multipart};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpResourceApi {
    config: Arc<ClientConfig>,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl HttpResourceApi {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
            tokens,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // No token, no call.
    fn request(&self, endpoint: Endpoint<'_>) -> ApiResult<RequestBuilder> {
        let token = self.tokens.bearer_token().ok_or(ApiError::Unauthenticated)?;
        let url = endpoint.url(&self.config.base_url)?;

        Ok(self
            .client
            .request(endpoint.method(), url)
            .bearer_auth(token))
    }

    async fn execute(&self, endpoint: Endpoint<'_>, builder: RequestBuilder) -> ApiResult<Value> {
        tracing::debug!(method = %endpoint.method(), path = %endpoint.path(), "calling api");

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        decode_envelope(status, &body)
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: Endpoint<'_>,
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let mut builder = self.request(endpoint)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(endpoint, builder).await
    }

    async fn get(&self, endpoint: Endpoint<'_>) -> ApiResult<Value> {
        self.send::<Value>(endpoint, None).await
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn create_request(&self, body: &CreateRequestBody) -> ApiResult<Ack> {
        let envelope = self.send(Endpoint::CreateRequest, Some(body)).await?;
        Ok(ack_of(&envelope))
    }

    async fn list_requests(&self, list: RequestList) -> ApiResult<Vec<ResourceRequest>> {
        data_of(self.get(Endpoint::List(list)).await?)
    }

    async fn stats(&self) -> ApiResult<RequestStats> {
        data_of(self.get(Endpoint::Stats).await?)
    }

    async fn approve_request(&self, id: &str, body: &ApprovalBody) -> ApiResult<Ack> {
        let envelope = self.send(Endpoint::Approve(id), Some(body)).await?;
        Ok(ack_of(&envelope))
    }

    async fn reject_request(&self, id: &str, body: &Rejection) -> ApiResult<Ack> {
        let envelope = self.send(Endpoint::Reject(id), Some(body)).await?;
        Ok(ack_of(&envelope))
    }

    async fn mark_delivered(&self, id: &str) -> ApiResult<Ack> {
        let envelope = self.send::<Value>(Endpoint::Deliver(id), None).await?;
        Ok(ack_of(&envelope))
    }

    async fn refetch(&self, id: &str, body: &RefetchOrder) -> ApiResult<Ack> {
        let envelope = self.send(Endpoint::Refetch(id), Some(body)).await?;
        Ok(ack_of(&envelope))
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<String> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let builder = self.request(Endpoint::Upload)?.multipart(form);

        let envelope = self.execute(Endpoint::Upload, builder).await?;
        uploaded_url_of(&envelope)
    }

    async fn complete_task(&self, grievance_id: &str, body: &CompletionBody) -> ApiResult<Ack> {
        let envelope = self
            .send(Endpoint::CompleteTask(grievance_id), Some(body))
            .await?;
        Ok(ack_of(&envelope))
    }
}
