//! Chat engine — the per-turn driver.
//!
//! One utterance flows route → assemble → generate → append. The session is
//! mutated at exactly two points: the user turn on submit and the reply turn
//! when generation settles. A fatal generation error still produces a reply
//! turn — a visible in-chat failure description — so the conversation
//! continues instead of the UI blocking.

use std::sync::Arc;

use deskmate_core::collaborator::{
    CalendarClient, LmsClient, SearchClient, SourceTag, WeatherClient,
};
use deskmate_core::llm::Generator;
use deskmate_core::session::{Session, Turn};
use tracing::{debug, warn};

use crate::assembler::ContextAssembler;
use crate::monitor::{BriefingThresholds, MonitorState, ProactiveMonitor};
use crate::persona::DEFAULT_PERSONA;
use crate::router::RoutingTable;

/// The assembled per-session engine.
pub struct ChatEngine {
    router: RoutingTable,
    assembler: ContextAssembler,
    monitor: ProactiveMonitor,
    generator: Arc<dyn Generator>,
    persona: String,
}

impl ChatEngine {
    pub fn new(
        router: RoutingTable,
        assembler: ContextAssembler,
        monitor: ProactiveMonitor,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            router,
            assembler,
            monitor,
            generator,
            persona: DEFAULT_PERSONA.into(),
        }
    }

    /// Override the persona / system instructions.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Convenience constructor wiring the standard components.
    pub fn build(
        lms: Arc<dyn LmsClient>,
        calendar: Arc<dyn CalendarClient>,
        search: Arc<dyn SearchClient>,
        weather: Arc<dyn WeatherClient>,
        generator: Arc<dyn Generator>,
        thresholds: BriefingThresholds,
    ) -> Self {
        let assembler =
            ContextAssembler::new(lms.clone(), calendar.clone(), search, weather);
        let monitor = ProactiveMonitor::new(lms, calendar, thresholds);
        Self::new(RoutingTable::new(), assembler, monitor, generator)
    }

    /// Run the proactive monitor once at session start. Returns whether a
    /// briefing was injected.
    pub async fn start_session(&mut self, session: &mut Session) -> MonitorState {
        self.monitor.evaluate(session).await
    }

    /// Process one user utterance and return the reply text.
    ///
    /// The reply is always appended to the session — generated text on
    /// success, a visible failure description on a fatal generation error.
    pub async fn respond(&self, session: &mut Session, utterance: &str) -> String {
        let tags = self.router.route(utterance);
        debug!(?tags, "Routed utterance");

        // History is everything before this utterance; the utterance itself
        // travels as the final message of the generation request.
        let history: Vec<Turn> = session.turns().to_vec();
        session.push_user(utterance);

        let context = self.assembler.assemble(&tags, utterance).await;

        let reply = match self
            .generator
            .generate(&self.persona, &context.render(), &history, utterance)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Generation failed, surfacing in-chat");
                format!("I couldn't generate a reply: {e}")
            }
        };

        session.push_assistant(&reply);
        reply
    }

    /// The tags the router would select for an utterance (for diagnostics).
    pub fn route_preview(&self, utterance: &str) -> Vec<SourceTag> {
        self.router.route(utterance).into_iter().collect()
    }
}
