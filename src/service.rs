//! Service layer API for resource request workflow operations
use super::api::{Ack, RequestList, ResourceApi};
use super::completion::TaskCompletionDraft;
use super::draft::ResourceRequestDraft;
use super::error::{ApiError, ServiceError, ValidationError};
use super::request::ResourceRequest;
use super::review::{ApprovalBody, ApprovalDecision, RefetchOrder, Rejection};
use super::status::RequestStats;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Keys of actions currently awaiting the backend.
#[derive(Debug, Default, Clone)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Releases its key when dropped, whether the call finished or was abandoned.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    pub fn try_begin(&self, key: String) -> ServiceResult<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !keys.insert(key.clone()) {
            tracing::warn!(action = %key, "duplicate submission ignored");
            return Err(ServiceError::InFlight(key));
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        keys.remove(&self.key);
    }
}

fn refused<T>(action: &str, err: ValidationError) -> ServiceResult<T> {
    tracing::warn!(action, reason = %err, "validation refused action");
    Err(err.into())
}

fn failed(action: &str, err: ApiError) -> ServiceError {
    tracing::error!(action, error = %err, "api call failed");
    err.into()
}

pub struct RequestService {
    api: Arc<dyn ResourceApi>,
    in_flight: InFlight,
}

impl RequestService {
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self {
            api,
            in_flight: InFlight::default(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Submit a new resource request for approval
    pub async fn submit_request(&self, draft: &ResourceRequestDraft) -> ServiceResult<Ack> {
        let (fingerprint, body) = match draft.validate_and_finalise() {
            Ok(finalised) => finalised,
            Err(err) => match err.downcast::<ValidationError>() {
                Ok(err) => return refused("create", err),
                Err(err) => return Err(ServiceError::Internal(err)),
            },
        };

        let _guard = self.in_flight.try_begin(format!("create:{fingerprint}"))?;
        let ack = self
            .api
            .create_request(&body)
            .await
            .map_err(|e| failed("create", e))?;

        tracing::info!(grievance = %body.grievance_id, priority = ?body.priority, "resource request submitted");
        Ok(ack)
    }

    /// Approve a pending request, allocating the sum of approved costs
    pub async fn approve_request(
        &self,
        request: &ResourceRequest,
        decision: ApprovalDecision,
    ) -> ServiceResult<Ack> {
        let body = match ApprovalBody::new(decision, request) {
            Ok(body) => body,
            Err(err) => return refused("approve", err),
        };

        let _guard = self.in_flight.try_begin(format!("approve:{}", request.id))?;
        let ack = self
            .api
            .approve_request(&request.id, &body)
            .await
            .map_err(|e| failed("approve", e))?;

        tracing::info!(id = %request.id, allocated = body.allocated_amount, status = body.status.as_str(), "request approved");
        Ok(ack)
    }

    pub async fn reject_request(
        &self,
        request_id: &str,
        reason: &str,
        admin_message: Option<&str>,
    ) -> ServiceResult<Ack> {
        let body = match Rejection::new(reason, admin_message) {
            Ok(body) => body,
            Err(err) => return refused("reject", err),
        };

        let _guard = self.in_flight.try_begin(format!("reject:{request_id}"))?;
        let ack = self
            .api
            .reject_request(request_id, &body)
            .await
            .map_err(|e| failed("reject", e))?;

        tracing::info!(id = %request_id, "request rejected");
        Ok(ack)
    }

    pub async fn mark_delivered(&self, request_id: &str) -> ServiceResult<Ack> {
        let _guard = self.in_flight.try_begin(format!("deliver:{request_id}"))?;
        let ack = self
            .api
            .mark_delivered(request_id)
            .await
            .map_err(|e| failed("deliver", e))?;

        tracing::info!(id = %request_id, "request marked delivered");
        Ok(ack)
    }

    /// Reclaim part of a request's unspent allocation
    pub async fn refetch_remaining(
        &self,
        request: &ResourceRequest,
        amount: f64,
        admin_message: &str,
        reason: &str,
    ) -> ServiceResult<Ack> {
        let body = match RefetchOrder::new(request, amount, admin_message, reason) {
            Ok(body) => body,
            Err(err) => return refused("refetch", err),
        };

        let _guard = self.in_flight.try_begin(format!("refetch:{}", request.id))?;
        let ack = self
            .api
            .refetch(&request.id, &body)
            .await
            .map_err(|e| failed("refetch", e))?;

        tracing::info!(id = %request.id, amount = body.refetch_amount, "allocation refetched");
        Ok(ack)
    }

    /// Uploads the after-task photo and records its hosted URL on the draft.
    /// On failure the draft keeps its previous image state.
    pub async fn upload_after_image(
        &self,
        draft: &mut TaskCompletionDraft,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String> {
        let _guard = self.in_flight.try_begin(format!("upload:{file_name}"))?;
        let url = self
            .api
            .upload(file_name, bytes)
            .await
            .map_err(|e| failed("upload", e))?;

        draft.image_uploaded(url.clone());
        Ok(url)
    }

    /// Submit a finished task with its expenses. The ledger entries are
    /// discarded once the backend accepts the completion.
    pub async fn complete_task(
        &self,
        grievance_id: &str,
        draft: &mut TaskCompletionDraft,
    ) -> ServiceResult<Ack> {
        let body = match draft.validate_and_finalise() {
            Ok(body) => body,
            Err(err) => return refused("complete", err),
        };

        let _guard = self.in_flight.try_begin(format!("complete:{grievance_id}"))?;
        let ack = self
            .api
            .complete_task(grievance_id, &body)
            .await
            .map_err(|e| failed("complete", e))?;

        draft.ledger.clear();
        tracing::info!(grievance = %grievance_id, total = body.total_expense, "task completion submitted");
        Ok(ack)
    }

    /// Full replacement list; callers discard whatever they held before.
    pub async fn requests(&self, list: RequestList) -> ServiceResult<Vec<ResourceRequest>> {
        self.api
            .list_requests(list)
            .await
            .map_err(|e| failed("list", e))
    }

    pub async fn stats(&self) -> ServiceResult<RequestStats> {
        self.api.stats().await.map_err(|e| failed("stats", e))
    }
}
