//! Output formatting utilities
//!
//! Formatters for human-readable and JSON output, plus the spinner used
//! by long-running commands.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress spinners
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Fold the `[defaults]` section of the config file into the CLI flags
    ///
    /// Flags only ever switch features off, so a default can turn JSON on
    /// or colors off but never undo an explicit flag.
    pub fn with_defaults(mut self, defaults: &vault_core::config::Defaults) -> Self {
        self.json |= defaults.output == "json";
        self.no_color |= defaults.color == "never";
        self.no_progress |= !defaults.progress;
        self
    }
}
