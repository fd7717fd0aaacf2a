//! Per-call cancellation and deadline context.
//!
//! # Responsibility
//! - Let callers cancel or bound a repository call from another thread.
//! - Abort in-flight SQLite statements once the context is done.
//!
//! # Invariants
//! - Clones share one cancellation flag.
//! - A done context makes every round trip fail with `RepoError::Cancelled`.
//! - At most one interrupt guard is installed per connection at a time; only
//!   public repository entry points install one.

use super::item_repo::{RepoError, RepoResult};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of SQLite VM instructions between two cancellation checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

/// Cancellation handle passed to every repository operation.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// Context that is never done unless `cancel` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that is done once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Context that is done once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Marks this context and all its clones as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether the context was cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fails with `RepoError::Cancelled` when the context is done.
    pub fn check(&self) -> RepoResult<()> {
        if self.is_done() {
            return Err(RepoError::Cancelled);
        }
        Ok(())
    }

    /// Installs a progress handler on `conn` that interrupts running
    /// statements once this context is done. Removed when the guard drops.
    pub(crate) fn interrupt_guard<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> RepoResult<InterruptGuard<'conn>> {
        self.check()?;
        let watched = self.clone();
        conn.progress_handler(PROGRESS_CHECK_INTERVAL, Some(move || watched.is_done()));
        Ok(InterruptGuard { conn })
    }
}

pub(crate) struct InterruptGuard<'conn> {
    conn: &'conn Connection,
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.conn
            .progress_handler(PROGRESS_CHECK_INTERVAL, None::<fn() -> bool>);
    }
}

#[cfg(test)]
mod tests {
    use super::QueryContext;
    use crate::repo::item_repo::RepoError;
    use rusqlite::Connection;
    use std::time::{Duration, Instant};

    const SLOW_COUNT_SQL: &str = "WITH RECURSIVE counter(x) AS (
            SELECT 1
            UNION ALL
            SELECT x + 1 FROM counter LIMIT 500000000
        )
        SELECT COUNT(*) FROM counter;";

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = QueryContext::new();
        let clone = ctx.clone();
        assert!(ctx.check().is_ok());

        clone.cancel();
        assert!(ctx.is_done());
        assert!(matches!(ctx.check(), Err(RepoError::Cancelled)));
    }

    #[test]
    fn past_deadline_is_done() {
        let ctx = QueryContext::with_deadline(Instant::now());
        assert!(ctx.is_done());

        let generous = QueryContext::with_timeout(Duration::from_secs(3600));
        assert!(!generous.is_done());
        assert!(generous.deadline().is_some());
    }

    #[test]
    fn guard_interrupts_running_statement_after_deadline() {
        let conn = Connection::open_in_memory().unwrap();
        let ctx = QueryContext::with_timeout(Duration::from_millis(50));

        let started_at = Instant::now();
        let result = {
            let _guard = ctx.interrupt_guard(&conn).unwrap();
            conn.query_row(SLOW_COUNT_SQL, [], |row| row.get::<_, i64>(0))
                .map_err(RepoError::from)
        };

        assert!(matches!(result, Err(RepoError::Cancelled)));
        assert!(started_at.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn guard_is_removed_on_drop() {
        let conn = Connection::open_in_memory().unwrap();
        let ctx = QueryContext::new();
        {
            let _guard = ctx.interrupt_guard(&conn).unwrap();
        }
        ctx.cancel();

        let value: i64 = conn
            .query_row("SELECT 40 + 2;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn guard_refuses_to_install_for_done_context() {
        let conn = Connection::open_in_memory().unwrap();
        let ctx = QueryContext::new();
        ctx.cancel();

        assert!(matches!(
            ctx.interrupt_guard(&conn),
            Err(RepoError::Cancelled)
        ));
    }
}
