use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{
    error::AdminError,
    source::{ListQuery, PageResult, RecordSource},
};

/// Fetches pages from a [`RecordSource`] and owns the resulting list snapshot.
///
/// The snapshot is written only when a load completes successfully, and then
/// replaced wholesale. Concurrent loads are not serialized: whichever finishes
/// last wins.
pub struct DataLoader<S: RecordSource> {
    source: Arc<S>,
    snapshot: RwLock<PageResult<S::Record>>,
    in_flight: LoadingHandle,
    timeout: Option<Duration>,
}

/// Cloneable view of a loader's in-flight state. Front ends keep one to
/// show a spinner while a page operation is awaiting its load.
#[derive(Debug, Clone, Default)]
pub struct LoadingHandle(Arc<AtomicUsize>);

impl LoadingHandle {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: RecordSource> DataLoader<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(PageResult::default()),
            in_flight: LoadingHandle::default(),
            timeout: None,
        }
    }

    /// Bounds every list request so a stalled call cannot leave the page
    /// loading forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_loading()
    }

    pub fn loading_handle(&self) -> LoadingHandle {
        self.in_flight.clone()
    }

    pub async fn snapshot(&self) -> PageResult<S::Record> {
        self.snapshot.read().await.clone()
    }

    /// Fetches `query` and replaces the snapshot on success. On failure the
    /// previous snapshot stays in place and the error is logged and returned.
    pub async fn load(&self, query: &ListQuery) -> Result<(), AdminError> {
        let _loading = LoadingGuard::enter(&self.in_flight.0);
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.list(query))
                .await
                .unwrap_or_else(|_| Err(AdminError::timeout(limit))),
            None => self.source.list(query).await,
        };

        match outcome {
            Ok(result) => {
                info!(
                    page = result.page,
                    total_pages = result.total_pages,
                    items = result.items.len(),
                    search = %query.search,
                    "list loaded"
                );
                *self.snapshot.write().await = result;
                Ok(())
            }
            Err(err) => {
                warn!(
                    page = query.page,
                    search = %query.search,
                    kind = ?err.kind(),
                    "list load failed; keeping previous results: {err}"
                );
                Err(err)
            }
        }
    }

    /// Runs a create/update/delete call and, if it succeeds, reloads
    /// `reload` once so the view reflects the server's state.
    pub async fn mutate<R, F>(
        &self,
        action: &'static str,
        operation: F,
        reload: &ListQuery,
    ) -> Result<R, AdminError>
    where
        F: Future<Output = Result<R, AdminError>>,
    {
        match operation.await {
            Ok(value) => {
                info!(action, "mutation succeeded; reloading");
                // Load failures are already logged and leave the old list up.
                let _ = self.load(reload).await;
                Ok(value)
            }
            Err(err) => {
                error!(action, kind = ?err.kind(), "mutation failed: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
