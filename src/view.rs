//! Load state for data-backed views
//!
//! A view moves `Idle → Loading → Ready | Failed` on every fetch, and each
//! successful fetch replaces what it held before. Once a view is disposed,
//! results that arrive late are dropped instead of written to a detached view.
use crate::api::Ack;
use crate::config::ClientConfig;
use crate::error::ServiceError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

impl Ack {
    /// Success notice carrying the server's message, or `fallback` without one.
    pub fn notice(&self, fallback: &str) -> Notice {
        Notice::success(self.message.clone().unwrap_or_else(|| fallback.to_string()))
    }
}

impl ServiceError {
    pub fn notice(&self) -> Notice {
        match self {
            ServiceError::Validation(err) => Notice::error(err.to_string()),
            ServiceError::Api(err) => Notice::error(err.user_message()),
            ServiceError::InFlight(_) => Notice::error("Please wait, this is still being processed"),
            ServiceError::Internal(_) => Notice::error(crate::error::GENERIC_FAILURE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(Notice),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

pub struct ViewCell<T> {
    state: Arc<RwLock<ViewState<T>>>,
    disposed: Arc<AtomicBool>,
}

impl<T> Clone for ViewCell<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            disposed: Arc::clone(&self.disposed),
        }
    }
}

impl<T> Default for ViewCell<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewState::Idle)),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ViewCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> ViewState<T> {
        self.state.read().await.clone()
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Runs one fetch through the state machine. Returns `false` when the
    /// view was disposed before the result arrived and nothing was written.
    pub async fn load<Fut>(&self, fetch: Fut) -> bool
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        if self.is_disposed() {
            return false;
        }
        {
            let mut state = self.state.write().await;
            // dispose may have landed while waiting for the lock
            if self.is_disposed() {
                return false;
            }
            *state = ViewState::Loading;
        }

        let result = fetch.await;

        let mut state = self.state.write().await;
        if self.is_disposed() {
            tracing::debug!("view disposed, dropping late result");
            return false;
        }
        *state = match result {
            Ok(data) => ViewState::Ready(data),
            Err(err) => ViewState::Failed(err.notice()),
        };
        true
    }

    /// Re-fetches every `config.refresh_interval` until the view is disposed.
    pub fn spawn_refresh<F, Fut>(&self, config: &ClientConfig, fetch: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send,
    {
        let view = self.clone();
        let every = config.refresh_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !view.load(fetch()).await {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ValidationError};
    use std::time::Duration;

    #[tokio::test]
    async fn load_success_and_failure() {
        let view: ViewCell<Vec<u32>> = ViewCell::new();
        assert_eq!(view.snapshot().await, ViewState::Idle);

        assert!(view.load(async { Ok(vec![1, 2]) }).await);
        assert_eq!(view.snapshot().await.data(), Some(&vec![1, 2]));

        let failed = view
            .load(async {
                Err(ServiceError::Api(ApiError::Server {
                    status: 500,
                    message: Some("Database unavailable".into()),
                }))
            })
            .await;
        assert!(failed);
        assert_eq!(
            view.snapshot().await,
            ViewState::Failed(Notice::error("Database unavailable"))
        );
    }

    #[tokio::test]
    async fn disposed_view_ignores_late_result() {
        let view: ViewCell<u32> = ViewCell::new();
        let handle = view.clone();
        let applied = view
            .load(async move {
                handle.dispose();
                Ok(7)
            })
            .await;
        assert!(!applied);
        assert!(view.snapshot().await.is_loading());
    }

    #[test]
    fn ack_notice_falls_back() {
        let ack = Ack { message: None };
        assert_eq!(ack.notice("Request approved"), Notice::success("Request approved"));
    }

    #[test]
    fn validation_notice_uses_message() {
        let notice = ServiceError::from(ValidationError::MissingRejectionReason).notice();
        assert_eq!(notice, Notice::error("A rejection reason is required"));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_stops_after_dispose() {
        let view: ViewCell<u32> = ViewCell::new();
        let counter = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let c = Arc::clone(&counter);
        let config = ClientConfig {
            refresh_interval: Duration::from_secs(20),
            ..ClientConfig::default()
        };
        let task = view.spawn_refresh(&config, move || {
            let c = Arc::clone(&c);
            async move { Ok(c.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        // ticks at 0s, 20s and 40s
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(view.snapshot().await, ViewState::Ready(3));

        view.dispose();
        tokio::time::sleep(Duration::from_secs(21)).await;
        task.await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn dispose_while_waiting_for_lock_drops_result() {
        let view: ViewCell<u32> = ViewCell::new();
        let loader = view.clone();
        let task = tokio::spawn(async move {
            loader
                .load(async {
                    tokio::task::yield_now().await;
                    Ok(7)
                })
                .await
        });

        while !view.snapshot().await.is_loading() {
            tokio::task::yield_now().await;
        }
        // hold the state so the result write has to wait
        let guard = view.state.read().await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        view.dispose();
        drop(guard);

        assert!(!task.await.unwrap());
        assert!(view.snapshot().await.is_loading());
    }
}
