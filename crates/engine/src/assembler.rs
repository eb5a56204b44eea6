//! Context assembler — turns a router decision into one bounded text block.
//!
//! For each selected tag the matching collaborator is pulled (the utterance
//! reaches only the search collaborator; the rest return current state).
//! Sections render under labeled headers in the fixed assembly order
//! academic → calendar → search → weather, so output is stable and testable
//! regardless of which subset was requested.
//!
//! Assembly never raises: a failed pull contributes its sentinel string as a
//! section like any other payload, so the model can see and narrate the
//! outage instead of the turn aborting.

use std::collections::BTreeSet;
use std::sync::Arc;

use deskmate_core::collaborator::{
    CalendarClient, CollaboratorResult, LmsClient, SearchClient, SourceTag, WeatherClient,
};
use tracing::{debug, warn};

/// The assembled context for one turn. Transient — rendered into the model
/// prompt and discarded.
#[derive(Debug, Clone, Default)]
pub struct ContextBlock {
    pub sections: Vec<CollaboratorResult>,
}

impl ContextBlock {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render the block with one labeled header per section.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("[SOURCE: {}]\n{}", s.source.label(), s.payload))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Pulls selected collaborators and assembles their output.
pub struct ContextAssembler {
    lms: Arc<dyn LmsClient>,
    calendar: Arc<dyn CalendarClient>,
    search: Arc<dyn SearchClient>,
    weather: Arc<dyn WeatherClient>,
    weather_location: String,
    max_section_chars: usize,
}

impl ContextAssembler {
    pub fn new(
        lms: Arc<dyn LmsClient>,
        calendar: Arc<dyn CalendarClient>,
        search: Arc<dyn SearchClient>,
        weather: Arc<dyn WeatherClient>,
    ) -> Self {
        Self {
            lms,
            calendar,
            search,
            weather,
            weather_location: "New York".into(),
            max_section_chars: 4000,
        }
    }

    /// Set the location used for weather pulls.
    pub fn with_weather_location(mut self, location: impl Into<String>) -> Self {
        self.weather_location = location.into();
        self
    }

    /// Cap each section's payload at this many characters.
    pub fn with_max_section_chars(mut self, max: usize) -> Self {
        self.max_section_chars = max;
        self
    }

    /// Pull every selected source and assemble the block.
    ///
    /// Sources are pulled sequentially in assembly order; only the search
    /// collaborator sees the utterance.
    pub async fn assemble(
        &self,
        tags: &BTreeSet<SourceTag>,
        utterance: &str,
    ) -> ContextBlock {
        let mut sections = Vec::with_capacity(tags.len());

        for tag in SourceTag::ASSEMBLY_ORDER {
            if !tags.contains(&tag) {
                continue;
            }

            let result = match tag {
                SourceTag::Academic => self
                    .lms
                    .academic_audit()
                    .await
                    .map(|audit| audit.report),
                SourceTag::Calendar => self
                    .calendar
                    .calendar_audit()
                    .await
                    .map(|audit| audit.summary),
                SourceTag::Search => self.search.search(utterance).await,
                SourceTag::Weather => self.weather.weather(&self.weather_location).await,
            };

            let section = match result {
                Ok(payload) if payload.is_empty() => {
                    debug!(source = %tag, "Collaborator returned nothing, skipping section");
                    continue;
                }
                Ok(payload) => {
                    CollaboratorResult::ok(tag, self.cap(&payload))
                }
                Err(e) => {
                    warn!(source = %tag, error = %e, "Collaborator failed, including sentinel");
                    CollaboratorResult::failed(tag, &e)
                }
            };
            sections.push(section);
        }

        ContextBlock { sections }
    }

    fn cap(&self, payload: &str) -> String {
        if payload.len() <= self.max_section_chars {
            return payload.to_string();
        }
        let mut end = self.max_section_chars;
        while !payload.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &payload[..end])
    }
}
