//! Core engine: the scan → evaluate → alert cycle and the loop that drives it.

pub mod scanner;
pub mod scheduler;

pub use scanner::Scanner;
pub use scheduler::{Phase, Scheduler};
