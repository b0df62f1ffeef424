//! Cancellation for one load sequence.
//!
//! Every task spawned for a sequence is registered in a [`TaskScope`];
//! cancelling the scope trips the shared token and aborts the registered
//! tasks in one step, so no stage of a sequence can outlive the others.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::task::AbortHandle;

/// Cloneable view of a scope's cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Owns everything in flight for a single load sequence.
#[derive(Debug, Default)]
pub struct TaskScope {
    token: CancelToken,
    tasks: Vec<AbortHandle>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn register(&mut self, task: AbortHandle) {
        self.tasks.push(task);
    }

    /// Trips the token first so a task observing it mid-poll stops delivering,
    /// then aborts every registered task.
    pub fn cancel(&mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskScope;

    #[test]
    fn cancel_trips_every_token_clone() {
        let mut scope = TaskScope::new();
        let token = scope.token();
        assert!(!token.is_cancelled());
        scope.cancel();
        assert!(token.is_cancelled());
        assert!(scope.token().is_cancelled());
    }
}
