// Per-view loading flag and load result.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{ApiError, Route};

pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// What a data-backed view renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Failed(String),
    /// The backend rejected the token; show the prompt and go to `redirect`.
    SessionExpired { redirect: Route },
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            ViewState::SessionExpired { .. } => Some(SESSION_EXPIRED),
            ViewState::Loading | ViewState::Ready(_) => None,
        }
    }
}

/// Spinner flag owned by one view. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
    active: Arc<AtomicBool>,
}

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Raises the flag until the returned guard is dropped.
    pub fn begin(&self) -> LoadingGuard {
        self.active.store(true, Ordering::SeqCst);
        LoadingGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Runs one load with the flag raised and folds the result into a
    /// `ViewState`. The flag drops on every exit path, including a cancelled
    /// future.
    pub async fn track<T, F>(&self, fallback: &str, load: F) -> ViewState<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let _guard = self.begin();
        match load.await {
            Ok(value) => ViewState::Ready(value),
            Err(ApiError::Unauthorized) => {
                tracing::warn!("view load rejected the session.");
                ViewState::SessionExpired {
                    redirect: Route::Login,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "view load failed.");
                ViewState::Failed(err.user_message(fallback))
            }
        }
    }
}

#[must_use = "the loading flag clears as soon as the guard is dropped"]
pub struct LoadingGuard {
    active: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
