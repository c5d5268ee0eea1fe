//! The dialogue kernel.
//!
//! Everything under this module is synchronous and free of I/O: the
//! [`controller::DialogueController`] consumes [`event::Event`]s and returns
//! [`event::SideEffect`]s. The async [`reactor::Reactor`] is the only place
//! where effects touch engines, timers and the network.

pub mod cancel;
pub mod controller;
pub mod event;
pub mod executor;
pub mod intent;
pub mod reactor;
pub mod session;
pub mod speech;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod wake;
