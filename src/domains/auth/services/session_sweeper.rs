use chrono::Duration as ChronoDuration;
use tokio::time::{interval, Duration};

use crate::shared::database::{Database, SessionRepository};

/// Session Sweeper
///
/// Periodically deletes session records older than the refresh-token
/// lifetime. Stands in for a document-store TTL index: a record older than
/// the refresh lifetime eventually disappears without an explicit delete.
#[derive(Clone)]
pub struct SessionSweeper {
    db: Database,
    /// Session max-age in seconds (= refresh-token lifetime)
    max_age_secs: i64,
    /// Seconds between sweeps
    sweep_interval_secs: u64,
}

impl SessionSweeper {
    pub fn new(db: Database, max_age_secs: i64, sweep_interval_secs: u64) -> Self {
        Self {
            db,
            max_age_secs,
            sweep_interval_secs,
        }
    }

    /// Spawn the background sweep task
    pub fn start(&self) {
        let db = self.db.clone();
        let max_age = ChronoDuration::seconds(self.max_age_secs);
        let sweep_interval = self.sweep_interval_secs;

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(sweep_interval));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let sessions = SessionRepository::new(db.pool().clone());
                match sessions.delete_expired(max_age).await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::info!(removed, "swept expired session records");
                    }
                    Err(e) => {
                        tracing::error!("session sweep failed: {}", e);
                    }
                }
            }
        });
    }
}
