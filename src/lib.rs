pub mod config;
pub mod error;
pub mod inputs;
pub mod kernel;
pub mod outputs;
pub mod services;
pub mod speech;

// Re-export specific items for convenient access
pub use config::VoiceConfig;
pub use kernel::controller::DialogueController;
pub use kernel::reactor::Reactor;
