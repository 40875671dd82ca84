use std::{fmt, sync::Arc};

use chrono::NaiveDateTime;
use log::debug;
use serde::Deserialize;
use strum::{Display, EnumString};

use super::error::UnknownDirectionCode;

/// Timestamp format used by the feed: feed-local wall-clock time, no offset.
pub(crate) const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Travel direction of a departure, as encoded by the feed (`1` or `2`).
///
/// Which code means "toward the city" depends on the station; the relevant
/// direction is configuration, not a property of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum JourneyDirection {
    Outbound,
    Inbound,
}

impl JourneyDirection {
    /// The numeric code used by the feed.
    pub fn code(self) -> u8 {
        match self {
            Self::Outbound => 1,
            Self::Inbound => 2,
        }
    }
}

impl TryFrom<u8> for JourneyDirection {
    type Error = UnknownDirectionCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Outbound),
            2 => Ok(Self::Inbound),
            other => Err(UnknownDirectionCode(other)),
        }
    }
}

/// A candidate departure extracted from one feed fetch.
///
/// Constructed fresh on every fetch, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    direction: JourneyDirection,
    line: Option<String>,
    expected_time: NaiveDateTime,
}

impl Departure {
    pub fn new(
        direction: JourneyDirection,
        line: Option<String>,
        expected_time: NaiveDateTime,
    ) -> Self {
        Self {
            direction,
            line,
            expected_time,
        }
    }

    pub fn direction(&self) -> JourneyDirection {
        self.direction
    }

    /// Line identifier, when the feed provides one.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Expected departure time, in the feed's local time base.
    pub fn expected_time(&self) -> NaiveDateTime {
        self.expected_time
    }
}

impl fmt::Display for Departure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line {
            Some(line) => write!(
                f,
                "{} line {} at {}",
                self.direction, line, self.expected_time
            ),
            None => write!(f, "{} at {}", self.direction, self.expected_time),
        }
    }
}

/// The departures extracted from one fetch, plus the capture timestamp.
///
/// Immutable once captured; shared as [`Arc<FeedSnapshot>`] between the
/// repository and the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    departures: Vec<Departure>,
    captured_at: NaiveDateTime,
}

impl FeedSnapshot {
    pub fn new(departures: Vec<Departure>, captured_at: NaiveDateTime) -> Self {
        Self {
            departures,
            captured_at,
        }
    }

    /// Departures in feed order (assumed chronological).
    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }
}

/// Raw departure document as served by the feed endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DepartureDocument {
    #[serde(default)]
    trains: Vec<RawTrain>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTrain {
    journey_direction: u8,
    #[serde(default)]
    line_number: Option<String>,
    expected_date_time: String,
}

impl DepartureDocument {
    /// Converts the raw document into an immutable snapshot.
    ///
    /// Entries with an unknown direction code or a malformed timestamp are
    /// dropped individually; a document that deserialized at all is never
    /// rejected wholesale here.
    pub fn into_snapshot(self, captured_at: NaiveDateTime) -> Arc<FeedSnapshot> {
        let departures = self
            .trains
            .into_iter()
            .filter_map(|raw| {
                let direction = match JourneyDirection::try_from(raw.journey_direction) {
                    Ok(direction) => direction,
                    Err(e) => {
                        debug!("dropping feed entry: {e}");
                        return None;
                    }
                };

                let expected_time =
                    match NaiveDateTime::parse_from_str(&raw.expected_date_time, FEED_TIME_FORMAT) {
                        Ok(time) => time,
                        Err(e) => {
                            debug!(
                                "dropping feed entry with bad timestamp {:?}: {e}",
                                raw.expected_date_time
                            );
                            return None;
                        }
                    };

                Some(Departure::new(direction, raw.line_number, expected_time))
            })
            .collect();

        Arc::new(FeedSnapshot::new(departures, captured_at))
    }
}
