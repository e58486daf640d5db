use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Identifiers with an outstanding request.
///
/// An id can be acquired at most once at a time; a second acquire while the
/// first guard is alive is refused rather than queued. The guard releases the
/// id when dropped, so every exit path (success, failure, a dropped future)
/// clears the marker.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, id: &str) -> Option<InFlightGuard> {
        let inserted = self.lock().insert(id.to_string());
        if !inserted {
            return None;
        }
        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn snapshot(&self) -> HashSet<String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl InFlightGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// Number of list loads still waiting on the server. Overlapping loads are
/// allowed; the list counts as loading until the last one settles.
#[derive(Debug, Default)]
pub(crate) struct Loading {
    pending: AtomicUsize,
}

impl Loading {
    pub(crate) fn begin(&self) -> LoadingGuard<'_> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        LoadingGuard { loading: self }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }
}

pub(crate) struct LoadingGuard<'a> {
    loading: &'a Loading,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.pending.fetch_sub(1, Ordering::SeqCst);
    }
}
