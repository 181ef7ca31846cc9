use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned by a run that observed a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request was cancelled")]
pub struct Cancelled;

/// Cooperative cancellation flag shared between a request and its run.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() { Err(Cancelled) } else { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let cancel = Cancellation::new();
        let handle = cancel.clone();
        assert_eq!(handle.check(), Ok(()));

        cancel.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.check(), Err(Cancelled));
    }
}
