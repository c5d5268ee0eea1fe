//! Dialogue telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (controller or executor).
//!
//! # PRIVACY INVARIANT
//! Events must **NEVER** contain user content (transcripts, replies, topics).
//! Only states, modes, counts and tick durations are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
