/// Periodic expiration sweeping
///
/// Every tick, one set-based conditional statement deactivates all todos
/// whose deadline has passed and that are still active. The statement is
/// idempotent and race-free against concurrent API writes: the storage
/// engine's atomic conditional update decides each row, no application
/// lock is held, and a record deactivated by hand before the tick simply
/// matches nothing.
///
/// A failed tick is logged and skipped; the schedule itself never
/// terminates until cancellation is requested.
///
/// # Example
///
/// ```no_run
/// use todovault_sweeper::sweeper::ExpirationSweeper;
/// use tokio_util::sync::CancellationToken;
/// use std::time::Duration;
///
/// # async fn example(pool: sqlx::PgPool) {
/// let sweeper = ExpirationSweeper::new(pool, Duration::from_secs(60));
/// let cancel = CancellationToken::new();
///
/// sweeper.run(cancel).await;
/// # }
/// ```

use sqlx::PgPool;
use std::time::Duration;
use todovault_shared::models::todo::Todo;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Default interval between sweeps (60 seconds)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically deactivates overdue todos
pub struct ExpirationSweeper {
    /// Database connection pool
    db: PgPool,

    /// Time between sweeps
    interval: Duration,
}

impl ExpirationSweeper {
    /// Creates a sweeper with the given interval
    pub fn new(db: PgPool, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Creates a sweeper with the default 60 second interval
    pub fn with_default_interval(db: PgPool) -> Self {
        Self::new(db, DEFAULT_SWEEP_INTERVAL)
    }

    /// Gets the sweep interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one sweep
    ///
    /// # Errors
    ///
    /// Returns the database error if the bulk statement fails. Callers in
    /// the loop log and continue; only tests treat this as fatal.
    pub async fn tick(&self) -> Result<u64, sqlx::Error> {
        let expired = Todo::expire_overdue(&self.db).await?;

        if expired > 0 {
            info!(expired, "Deactivated overdue todos");
        } else {
            debug!("No overdue todos");
        }

        Ok(expired)
    }

    /// Runs the sweep loop until the token is cancelled
    ///
    /// The first tick fires after one full interval, not immediately, so a
    /// crash-restart loop cannot hammer the database.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Expiration sweeper started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // interval fires immediately once; consume that tick
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Expiration sweeper shutting down");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!(error = %e, "Sweep failed, will retry next interval");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval_is_one_minute() {
        assert_eq!(DEFAULT_SWEEP_INTERVAL, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_run_returns_on_cancellation() {
        // No database work happens before the first interval elapses, so a
        // disconnected pool is fine here
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let sweeper = ExpirationSweeper::new(pool, Duration::from_secs(3600));

        let cancel = CancellationToken::new();
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { sweeper.run(cancel).await })
        };

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .expect("sweeper task should not panic");
    }

    // Tick semantics against a live database are covered by the shared
    // crate's repository tests.
}
