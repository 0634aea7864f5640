//! Built-in log destinations.

pub mod console;
pub mod rotating_file;

pub use console::ConsoleDestination;
pub use rotating_file::{FileDestination, RotatingFileManager, MAX_FILE_SIZE_MB};
