use tokio::time::{Duration, Instant};

/// Wall-clock-delta session timer
///
/// Duration is computed from the delta between now and a stored start
/// instant, never by incrementing a counter per tick, so missed ticks can
/// not desynchronize the displayed duration from wall time. The clock runs
/// only while the session is recording; pausing freezes the accumulated
/// time and only `reset` zeroes it.
#[derive(Debug, Default)]
pub struct SessionClock {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl SessionClock {
    /// Create a stopped clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or resume the clock
    pub fn run(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Freeze the clock, keeping the accumulated time
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    /// Zero the clock and stop it
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the clock is currently running
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Total elapsed time
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }

    /// Total elapsed time in whole seconds
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_clock_accumulates_while_running() {
        let mut clock = SessionClock::new();
        clock.run();

        advance(Duration::from_secs(12)).await;
        assert_eq!(clock.elapsed_secs(), 12);
        assert!(clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_duration() {
        let mut clock = SessionClock::new();
        clock.run();

        advance(Duration::from_secs(12)).await;
        clock.pause();
        assert!(!clock.is_running());

        advance(Duration::from_secs(5)).await;
        assert_eq!(clock.elapsed_secs(), 12);

        clock.run();
        advance(Duration::from_secs(3)).await;
        assert_eq!(clock.elapsed_secs(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_zeroes_the_clock() {
        let mut clock = SessionClock::new();
        clock.run();
        advance(Duration::from_secs(30)).await;

        clock.reset();
        assert_eq!(clock.elapsed_secs(), 0);
        assert!(!clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_is_idempotent_while_running() {
        let mut clock = SessionClock::new();
        clock.run();
        advance(Duration::from_secs(4)).await;

        // A second run() must not restart the delta origin
        clock.run();
        advance(Duration::from_secs(4)).await;
        assert_eq!(clock.elapsed_secs(), 8);
    }
}
