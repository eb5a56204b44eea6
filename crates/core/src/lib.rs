//! # Deskmate Core
//!
//! Domain types, traits, and error definitions for the Deskmate assistant
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external system the engine talks to (LMS, calendar, search, weather,
//! LLM) is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod collaborator;
pub mod error;
pub mod llm;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use collaborator::{
    AcademicAudit, CalendarAudit, CalendarClient, CollaboratorResult, CourseStanding, LmsClient,
    MissingItem, SearchClient, SourceTag, WeatherClient,
};
pub use error::{CollaboratorError, Error, ErrorClass, GenerationError, Result};
pub use llm::{ChatRequest, ChatResponse, ChatTurn, Generator, LlmClient};
pub use session::{Role, Session, SessionId, Turn};
