pub mod process;
pub mod text;

pub use process::ProcessSpeaker;
pub use text::ConsoleSpeaker;
