use chrono::NaiveDateTime;

use crate::feed::{FeedSnapshot, JourneyDirection};

#[cfg(test)]
mod tests;

const DEFAULT_PROXIMITY_THRESHOLD_SECS: i64 = 720;

/// Configuration for [`DepartureSelector`].
#[derive(Clone, Debug)]
pub struct SelectorConfig {
    direction: JourneyDirection,
    line: Option<String>,
    proximity_threshold_secs: i64,
}

impl SelectorConfig {
    pub fn new(direction: JourneyDirection) -> Self {
        Self {
            direction,
            line: None,
            proximity_threshold_secs: DEFAULT_PROXIMITY_THRESHOLD_SECS,
        }
    }

    /// Returns the direction a departure must match to be relevant.
    pub fn direction(&self) -> JourneyDirection {
        self.direction
    }

    /// Returns the line filter, if one is configured.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Returns the proximity-skip threshold in seconds.
    pub fn proximity_threshold_secs(&self) -> i64 {
        self.proximity_threshold_secs
    }

    /// Restricts relevance to a single line.
    ///
    /// Default: no line filter
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Sets the proximity-skip threshold.
    ///
    /// Default: `720` seconds (12 minutes)
    pub fn with_proximity_threshold_secs(mut self, secs: i64) -> Self {
        self.proximity_threshold_secs = secs;
        self
    }
}

/// Reduces a feed snapshot to "seconds until the relevant departure".
pub struct DepartureSelector {
    config: SelectorConfig,
}

impl DepartureSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Selects the departure worth leaving for and returns the seconds until
    /// it, measured from `now` in the feed's local time base.
    ///
    /// Relevant departures are those matching the configured direction (and
    /// line, when one is set), in feed order. With at least two candidates
    /// whose gap is below the proximity threshold, the first is skipped: a
    /// rider who just missed the very next train should see the time to the
    /// following one, not a near-zero value for a train effectively gone.
    ///
    /// Returns `None` when no departure is relevant; callers must treat that
    /// as the worst case, never as "plenty of time". The returned value may
    /// be negative (departure already due), which callers treat like a very
    /// small positive value.
    pub fn select(&self, snapshot: &FeedSnapshot, now: NaiveDateTime) -> Option<i64> {
        let mut relevant = snapshot.departures().iter().filter(|departure| {
            departure.direction() == self.config.direction
                && self
                    .config
                    .line()
                    .is_none_or(|line| departure.line() == Some(line))
        });

        let first = relevant.next()?;
        let first_secs = (first.expected_time() - now).num_seconds();

        let Some(second) = relevant.next() else {
            return Some(first_secs);
        };

        let second_secs = (second.expected_time() - now).num_seconds();
        if second_secs - first_secs < self.config.proximity_threshold_secs {
            Some(second_secs)
        } else {
            Some(first_secs)
        }
    }
}
