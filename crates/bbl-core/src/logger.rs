//! User-facing progress output

use colored::Colorize;

/// Receives the named phases of a pipeline ("generating cloud config", ...)
pub trait StepLogger: Send + Sync {
    fn step(&self, message: &str);

    /// Plain output for query commands (addresses, keys, env files)
    fn println(&self, message: &str);
}

/// Prints steps to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl StepLogger for ConsoleLogger {
    fn step(&self, message: &str) {
        tracing::debug!(step = message);
        println!("{} {}", "step:".cyan().bold(), message);
    }

    fn println(&self, message: &str) {
        println!("{}", message);
    }
}
