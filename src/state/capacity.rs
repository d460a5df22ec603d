//! Capacity tracking and event status derivation
//!
//! Local spot counts are optimistic; the arithmetic here only ever adjusts a
//! cached value that the next server fetch replaces.

use chrono::{Duration, NaiveDateTime};
use crate::models::{CapacitySnapshot, EventDefinition};

/// Window in which an upcoming event counts as "soon"
pub const SOON_WINDOW_DAYS: i64 = 7;

/// Clamp a raw spot count for display
pub fn display_spots(raw: i64) -> i64 {
    raw.max(0)
}

/// One spot taken, never below zero
pub fn take_spot(spots: Option<i64>) -> Option<i64> {
    spots.map(|s| (s - 1).max(0))
}

/// One spot released; no upper clamp, other registrants move the count too
pub fn release_spot(spots: Option<i64>) -> Option<i64> {
    spots.map(|s| s + 1)
}

/// What to show for an event's capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotsDisplay {
    Unlimited,
    Limited(i64),
    Unknown,
}

impl SpotsDisplay {
    /// Resolve the display value; a fetched count wins over the derived fallback
    pub fn resolve(event: Option<&EventDefinition>, snapshot: &CapacitySnapshot) -> Self {
        match event {
            Some(event) if event.capacity_limit().is_none() => SpotsDisplay::Unlimited,
            Some(event) => {
                let raw = snapshot
                    .available_spots
                    .or_else(|| event.derived_available_spots())
                    .unwrap_or(0);
                SpotsDisplay::Limited(display_spots(raw))
            }
            None => match snapshot.available_spots {
                Some(raw) => SpotsDisplay::Limited(display_spots(raw)),
                None => SpotsDisplay::Unknown,
            },
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, SpotsDisplay::Limited(0))
    }
}

impl std::fmt::Display for SpotsDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotsDisplay::Unlimited => write!(f, "Unlimited spots"),
            SpotsDisplay::Limited(0) => write!(f, "Event full"),
            SpotsDisplay::Limited(1) => write!(f, "1 spot left"),
            SpotsDisplay::Limited(n) => write!(f, "{} spots left", n),
            SpotsDisplay::Unknown => write!(f, "Availability unknown"),
        }
    }
}

/// Where an event sits in time relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Past,
    Ongoing,
    Today,
    Soon { days_until: i64 },
    Upcoming,
}

impl EventStatus {
    /// Derive the status of an event window at `now`
    pub fn derive(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> Self {
        if end < now {
            return EventStatus::Past;
        }
        if start <= now {
            return EventStatus::Ongoing;
        }
        if start.date() == now.date() {
            return EventStatus::Today;
        }
        if start - now <= Duration::days(SOON_WINDOW_DAYS) {
            let days_until = (start.date() - now.date()).num_days();
            return EventStatus::Soon { days_until };
        }
        EventStatus::Upcoming
    }

    pub fn of(event: &EventDefinition, now: NaiveDateTime) -> Self {
        Self::derive(event.start_time, event.end_time, now)
    }

    /// Display label
    pub fn label(&self) -> String {
        match self {
            EventStatus::Past => "Ended".to_string(),
            EventStatus::Ongoing => "Happening now".to_string(),
            EventStatus::Today => "Today".to_string(),
            EventStatus::Soon { days_until: 1 } => "Tomorrow".to_string(),
            EventStatus::Soon { days_until } => format!("In {} days", days_until),
            EventStatus::Upcoming => "Upcoming".to_string(),
        }
    }

    /// Only past events are closed for registration
    pub fn allows_registration(&self) -> bool {
        !matches!(self, EventStatus::Past)
    }
}
