pub mod console;

pub use console::ConsoleRecognizer;
