//! The backend seen from the client: endpoint table, response envelope and the
//! `ResourceApi` trait the service talks to.
//!
//! Responses share one envelope, `{ success, message?, data? }`. A non-2xx status
//! and a 2xx response with `success: false` are both failures; the server's
//! `message` is kept so it can be shown to the user.
use crate::completion::CompletionBody;
use crate::draft::CreateRequestBody;
use crate::error::ApiError;
use crate::request::ResourceRequest;
use crate::review::{ApprovalBody, RefetchOrder, Rejection};
use crate::status::RequestStats;
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub type ApiResult<T> = Result<T, ApiError>;

/// Which list of requests to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestList {
    Pending,
    All,
    Mine,
    Allocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    CreateRequest,
    List(RequestList),
    Stats,
    Approve(&'a str),
    Reject(&'a str),
    Deliver(&'a str),
    Refetch(&'a str),
    Upload,
    CompleteTask(&'a str),
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::List(_) | Endpoint::Stats => Method::GET,
            Endpoint::CreateRequest | Endpoint::Refetch(_) | Endpoint::Upload => Method::POST,
            Endpoint::Approve(_)
            | Endpoint::Reject(_)
            | Endpoint::Deliver(_)
            | Endpoint::CompleteTask(_) => Method::PUT,
        }
    }

    fn segments(&self) -> Vec<&str> {
        match *self {
            Endpoint::CreateRequest => vec!["resource-request", "create"],
            Endpoint::List(RequestList::Pending) => vec!["resource-request", "pending"],
            Endpoint::List(RequestList::All) => vec!["resource-request", "all"],
            Endpoint::List(RequestList::Mine) => vec!["resource-request", "my-requests"],
            Endpoint::List(RequestList::Allocated) => vec!["resource-request", "allocated"],
            Endpoint::Stats => vec!["resource-request", "stats"],
            Endpoint::Approve(id) => vec!["resource-request", id, "approve"],
            Endpoint::Reject(id) => vec!["resource-request", id, "reject"],
            Endpoint::Deliver(id) => vec!["resource-request", id, "deliver"],
            Endpoint::Refetch(id) => vec!["resource-request", id, "refetch"],
            Endpoint::Upload => vec!["upload"],
            Endpoint::CompleteTask(id) => vec!["grievances", id, "complete"],
        }
    }

    /// Path template with ids filled in, for logs.
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// Full URL under `base`; ids are percent-encoded as single path segments.
    pub fn url(&self, base: &str) -> ApiResult<Url> {
        let mut url = Url::parse(base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(self.segments());
        Ok(url)
    }
}

/// Acknowledgement of a mutation; views re-fetch to see its effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

/// Checks status and success flag, returning the whole JSON body.
pub fn decode_envelope(status: u16, body: &str) -> ApiResult<Value> {
    let message_of = |v: &Value| {
        v.get("message")
            .and_then(Value::as_str)
            .map(String::from)
    };

    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body).ok().and_then(|v| message_of(&v));
        return Err(ApiError::Server { status, message });
    }

    let value: Value = serde_json::from_str(body)?;
    // absent flag means the endpoint does not use one
    let success = value.get("success").and_then(Value::as_bool).unwrap_or(true);
    if !success {
        return Err(ApiError::Rejected {
            message: message_of(&value),
        });
    }
    Ok(value)
}

pub fn data_of<T: DeserializeOwned>(mut envelope: Value) -> ApiResult<T> {
    match envelope.get_mut("data").map(Value::take) {
        None | Some(Value::Null) => Err(ApiError::MissingData),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

pub fn ack_of(envelope: &Value) -> Ack {
    Ack {
        message: envelope
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

/// Hosted URL from an upload response, under `data.url` or top-level `url`.
pub fn uploaded_url_of(envelope: &Value) -> ApiResult<String> {
    envelope
        .pointer("/data/url")
        .or_else(|| envelope.get("url"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .ok_or(ApiError::MissingData)
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn create_request(&self, body: &CreateRequestBody) -> ApiResult<Ack>;

    async fn list_requests(&self, list: RequestList) -> ApiResult<Vec<ResourceRequest>>;

    async fn stats(&self) -> ApiResult<RequestStats>;

    async fn approve_request(&self, id: &str, body: &ApprovalBody) -> ApiResult<Ack>;

    async fn reject_request(&self, id: &str, body: &Rejection) -> ApiResult<Ack>;

    async fn mark_delivered(&self, id: &str) -> ApiResult<Ack>;

    async fn refetch(&self, id: &str, body: &RefetchOrder) -> ApiResult<Ack>;

    /// Uploads a file and returns the hosted URL.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<String>;

    async fn complete_task(&self, grievance_id: &str, body: &CompletionBody) -> ApiResult<Ack>;
}
