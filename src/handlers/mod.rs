//! Handler implementations

pub mod buffered_file;
pub mod console;
pub mod file;
pub mod rotating_file;

pub use buffered_file::BufferedFileHandler;
pub use console::{ConsoleHandler, ConsoleStream};
pub use file::FileHandler;
pub use rotating_file::RotatingFileHandler;

pub use crate::core::Handler;
