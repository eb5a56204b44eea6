//! # Deskmate Engine
//!
//! The decision core: which sources to pull for an utterance, how their
//! output becomes one bounded context block, and whether the assistant
//! should speak first at session start.
//!
//! Components:
//! - [`router`] — keyword → source-tag routing, pure and data-driven
//! - [`assembler`] — ordered, sentinel-tolerant context block assembly
//! - [`monitor`] — the session-start proactive briefing state machine
//! - [`chat`] — the per-turn driver wiring it all to a Session

pub mod assembler;
pub mod chat;
pub mod monitor;
pub mod persona;
pub mod router;

pub use assembler::{ContextAssembler, ContextBlock};
pub use chat::ChatEngine;
pub use monitor::{BriefingThresholds, BriefingTrigger, MonitorState, ProactiveMonitor};
pub use persona::DEFAULT_PERSONA;
pub use router::RoutingTable;
