//! Throughput and ETA estimation from rate-limit events
//!
//! Once the forum starts answering with HTTP 429, every throttle event is a
//! sample of how far the crawl got and when. The spread across the most recent
//! samples gives the sustained request rate, and from it an ETA for the
//! remaining threads.

use serde::Deserialize;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Number of throttle samples kept for the rate estimate
pub const RATE_WINDOW: usize = 5;

/// One throttle event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSample {
    /// Seconds since the estimator was created
    pub timestamp: f64,

    /// Progress index of the request that was throttled
    pub request_index: usize,
}

/// What happens to the sample window after the crawl recovers from throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleWindow {
    /// Once throttled, stay throttled: later episodes keep extending the
    /// same window
    #[default]
    Accumulate,

    /// A successful response clears the throttled state, so the next
    /// throttle event starts a fresh window
    RestartOnRecovery,
}

/// A computed rate and time remaining
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Requests per second across the sample window
    pub rate: f64,

    /// Estimated seconds until the last request
    pub eta_secs: u64,
}

impl RateEstimate {
    /// ETA formatted as `HH:MM:SS`
    pub fn eta_display(&self) -> String {
        format_hms(self.eta_secs)
    }
}

/// Formats seconds as `HH:MM:SS`
pub fn format_hms(secs: u64) -> String {
    let (m, s) = (secs / 60, secs % 60);
    let (h, m) = (m / 60, m % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Tracks throttle events and estimates throughput
#[derive(Debug)]
pub struct RateLimitEstimator {
    started: Instant,
    throttled: bool,
    samples: VecDeque<RateLimitSample>,
    window: ThrottleWindow,
}

impl RateLimitEstimator {
    /// Creates an estimator with an empty sample window
    pub fn new(window: ThrottleWindow) -> Self {
        Self {
            started: Instant::now(),
            throttled: false,
            samples: VecDeque::with_capacity(RATE_WINDOW + 1),
            window,
        }
    }

    /// Returns true once a throttle event has been seen
    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// The retained samples, oldest first
    pub fn samples(&self) -> &VecDeque<RateLimitSample> {
        &self.samples
    }

    /// Records a throttle event at the current time
    ///
    /// # Arguments
    ///
    /// * `current` - Progress index of the throttled request
    /// * `max` - Total number of requests in the crawl
    ///
    /// # Returns
    ///
    /// The rate estimate, or `None` if there is not enough data yet
    pub fn on_throttle(&mut self, current: usize, max: usize) -> Option<RateEstimate> {
        let now = self.started.elapsed().as_secs_f64();
        self.record_at(now, current, max)
    }

    /// Records a throttle event at an explicit timestamp
    pub fn record_at(&mut self, timestamp: f64, current: usize, max: usize) -> Option<RateEstimate> {
        let sample = RateLimitSample {
            timestamp,
            request_index: current,
        };

        if !self.throttled {
            self.throttled = true;
            self.samples.clear();
            self.samples.push_back(sample);
            return None;
        }

        self.samples.push_back(sample);
        while self.samples.len() > RATE_WINDOW {
            self.samples.pop_front();
        }

        self.estimate(current, max)
    }

    /// Notes a request that was not throttled
    pub fn on_success(&mut self) {
        if self.throttled && self.window == ThrottleWindow::RestartOnRecovery {
            tracing::debug!("Throttling cleared, restarting rate window");
            self.throttled = false;
            self.samples.clear();
        }
    }

    fn estimate(&self, current: usize, max: usize) -> Option<RateEstimate> {
        let (first, last) = (self.samples.front()?, self.samples.back()?);
        if self.samples.len() < 2 {
            return None;
        }

        let elapsed = last.timestamp - first.timestamp;
        let requests = last.request_index as f64 - first.request_index as f64;
        if elapsed <= 0.0 {
            return None;
        }

        let rate = requests / elapsed;
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }

        let remaining = max.saturating_sub(current) as f64;
        Some(RateEstimate {
            rate,
            eta_secs: (remaining / rate) as u64,
        })
    }
}

impl Default for RateLimitEstimator {
    fn default() -> Self {
        Self::new(ThrottleWindow::default())
    }
}
