//! Cooldown applied when the game reports exhausted stamina.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::{sleep, Instant};
use tracing::info;

/// How long stamina takes to refill.
pub const STAMINA_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Suspends the caller for a fixed cooldown.
///
/// The wait is awaited inline by the notification worker, so nothing else is
/// processed until it has fully elapsed. There is no way to cut it short.
#[derive(Debug, Clone)]
pub struct BackoffController {
    cooldown: Duration,
}

impl Default for BackoffController {
    fn default() -> Self {
        Self::new(STAMINA_COOLDOWN)
    }
}

impl BackoffController {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Wait out the configured cooldown.
    pub async fn cool_down(&self) {
        self.suspend(self.cooldown()).await;
    }

    /// Block the current task for exactly `duration`.
    pub async fn suspend(&self, duration: Duration) {
        match resume_time(duration) {
            Some(resume_at) => info!(
                "Insufficient stamina! Waiting {} minutes before battling again (until {})",
                duration.as_secs() / 60,
                resume_at.format("%H:%M:%S")
            ),
            None => info!(
                "Insufficient stamina! Waiting {} minutes before battling again",
                duration.as_secs() / 60
            ),
        }

        let started = Instant::now();
        sleep(duration).await;

        info!(
            "Assuming stamina is full after {:.0}s. Battling resumed.",
            started.elapsed().as_secs_f64()
        );
    }
}

/// Wall-clock time at which a wait of `duration` ends, if representable.
fn resume_time(duration: Duration) -> Option<DateTime<Local>> {
    let delta = chrono::Duration::from_std(duration).ok()?;
    Local::now().checked_add_signed(delta)
}
