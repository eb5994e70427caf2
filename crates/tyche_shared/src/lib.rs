//! # TYCHE Shared - Common Vocabulary
//!
//! Types spoken by every crate in the integrity subsystem.
//!
//! ## Contents
//!
//! - **Security events**: the structured audit record and the sink seam
//!   every detector emits through
//! - **Game-state snapshot**: the numeric facts the anti-cheat rules judge
//! - **Session context**: per-process identity stamped onto every event
//! - **Constants**: design ceilings baked into the client binary
//!
//! This crate performs no I/O. Persistence and detection live in
//! `tyche_vault` and `tyche_security`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod constants;
pub mod events;
pub mod session;
pub mod snapshot;

pub use events::{EventSink, MemorySink, NullSink, SecurityEvent, SecurityEventKind};
pub use session::SessionContext;
pub use snapshot::GameStateSnapshot;
