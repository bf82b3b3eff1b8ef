use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle for one layout computation, ordered by when its input arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket(u64);

impl LayoutTicket {
    pub fn epoch(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer input arrived before this result; it was dropped.
    Stale,
}

/// Keeps the most recent authoritative layout. Results are accepted only for
/// the latest issued ticket, whatever order computations finish in.
#[derive(Debug)]
pub struct LayoutSession<T> {
    issued: AtomicU64,
    current: Mutex<Option<(u64, Arc<T>)>>,
}

impl<T> Default for LayoutSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LayoutSession<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Registers a new input version. Earlier tickets become stale.
    pub fn begin(&self) -> LayoutTicket {
        LayoutTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest_epoch(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Publishes `result` if `ticket` is still the latest. Errors are returned
    /// to the caller and leave the published layout untouched.
    pub fn resolve<E>(&self, ticket: LayoutTicket, result: Result<T, E>) -> Result<Resolution, E> {
        let value = result?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 != self.latest_epoch() {
            tracing::debug!(
                epoch = ticket.0,
                latest = self.latest_epoch(),
                "discarding stale layout"
            );
            return Ok(Resolution::Stale);
        }
        *current = Some((ticket.0, Arc::new(value)));
        Ok(Resolution::Applied)
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, value)| Arc::clone(value))
    }

    pub fn current_epoch(&self) -> Option<u64> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(epoch, _)| *epoch)
    }
}
