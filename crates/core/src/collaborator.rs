//! Collaborator traits — the abstraction over external data sources.
//!
//! Each collaborator (LMS, calendar, search, weather) exposes a single pull
//! operation behind a narrow trait. Failures are expected: every pull returns
//! a typed `CollaboratorError` that the caller recovers locally (a sentinel
//! string in a context block, or a silent degrade in the proactive monitor).
//! Nothing here ever panics across the seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// The data source categories the router can select.
///
/// Variant order is the fixed assembly order — a `BTreeSet<SourceTag>`
/// iterates academic → calendar → search → weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Academic,
    Calendar,
    Search,
    Weather,
}

impl SourceTag {
    /// Assembly order for context blocks. Stable so output is testable.
    pub const ASSEMBLY_ORDER: [SourceTag; 4] = [
        SourceTag::Academic,
        SourceTag::Calendar,
        SourceTag::Search,
        SourceTag::Weather,
    ];

    /// The section header label used in assembled context blocks.
    pub fn label(&self) -> &'static str {
        match self {
            SourceTag::Academic => "ACADEMIC",
            SourceTag::Calendar => "CALENDAR",
            SourceTag::Search => "SEARCH",
            SourceTag::Weather => "WEATHER",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One collaborator's contribution to a context block.
///
/// `ok = false` means the pull failed and `payload` carries the
/// human-readable sentinel instead of data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorResult {
    pub source: SourceTag,
    pub payload: String,
    pub ok: bool,
}

impl CollaboratorResult {
    pub fn ok(source: SourceTag, payload: impl Into<String>) -> Self {
        Self {
            source,
            payload: payload.into(),
            ok: true,
        }
    }

    pub fn failed(source: SourceTag, error: &CollaboratorError) -> Self {
        Self {
            source,
            payload: error.sentinel(),
            ok: false,
        }
    }
}

/// A missing or upcoming piece of coursework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingItem {
    /// Assignment name
    pub name: String,

    /// Days until due. Zero or negative means overdue/unsubmitted.
    pub due_offset_days: i64,
}

/// Point-in-time standing in one enrolled course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseStanding {
    /// Course identifier (e.g. "MATH-101")
    pub id: String,

    /// Human-readable course name
    pub name: String,

    /// Current numeric score (percent), if the LMS reports one
    pub score: Option<f64>,

    /// Missing/overdue flags
    #[serde(default)]
    pub missing: Vec<MissingItem>,
}

/// The academic audit: a rendered report plus the structured records the
/// proactive monitor applies its thresholds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicAudit {
    pub report: String,
    pub courses: Vec<CourseStanding>,
}

/// The calendar audit: a rendered summary plus today's event density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarAudit {
    pub summary: String,
    pub events_today: usize,
}

/// Learning-management-system client.
#[async_trait]
pub trait LmsClient: Send + Sync {
    /// Pull the current academic standing across enrolled courses.
    async fn academic_audit(&self) -> std::result::Result<AcademicAudit, CollaboratorError>;
}

/// Calendar client.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Pull today's schedule summary and event count.
    async fn calendar_audit(&self) -> std::result::Result<CalendarAudit, CollaboratorError>;

    /// Push a new event. Returns a confirmation string.
    async fn add_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
    ) -> std::result::Result<String, CollaboratorError>;
}

/// Search + scrape client. The only collaborator that consumes the utterance.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Query an external index and return rendered result text.
    async fn search(&self, query: &str) -> std::result::Result<String, CollaboratorError>;
}

/// Weather client.
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Current conditions for a location, as display text.
    async fn weather(&self, location: &str) -> std::result::Result<String, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn btreeset_iterates_in_assembly_order() {
        // Insert out of order; iteration must match ASSEMBLY_ORDER.
        let mut tags = BTreeSet::new();
        tags.insert(SourceTag::Weather);
        tags.insert(SourceTag::Academic);
        tags.insert(SourceTag::Search);
        tags.insert(SourceTag::Calendar);

        let order: Vec<SourceTag> = tags.into_iter().collect();
        assert_eq!(order, SourceTag::ASSEMBLY_ORDER.to_vec());
    }

    #[test]
    fn labels_are_uppercase() {
        for tag in SourceTag::ASSEMBLY_ORDER {
            assert_eq!(tag.label(), tag.label().to_uppercase());
        }
    }

    #[test]
    fn failed_result_carries_sentinel() {
        let err = CollaboratorError::Auth("token expired".into());
        let result = CollaboratorResult::failed(SourceTag::Academic, &err);
        assert!(!result.ok);
        assert_eq!(result.payload, "Access Denied");
        assert_eq!(result.source, SourceTag::Academic);
    }

    #[test]
    fn missing_item_overdue_when_offset_not_positive() {
        let overdue = MissingItem {
            name: "Problem Set 4".into(),
            due_offset_days: -2,
        };
        let upcoming = MissingItem {
            name: "Essay draft".into(),
            due_offset_days: 5,
        };
        assert!(overdue.due_offset_days <= 0);
        assert!(upcoming.due_offset_days > 0);
    }
}
