//! Local terminal commands, resolved without any network call

use std::fmt;
use std::str::FromStr;

/// Keywords the controller handles itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Help,
    Status,
    Clear,
    History,
    Errors,
    Export,
    Stats,
    Debug,
    Reset,
}

impl LocalCommand {
    /// Every command, in help-panel order
    pub const ALL: [Self; 9] = [
        Self::Help,
        Self::Status,
        Self::Clear,
        Self::History,
        Self::Errors,
        Self::Export,
        Self::Stats,
        Self::Debug,
        Self::Reset,
    ];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Status => "status",
            Self::Clear => "clear",
            Self::History => "history",
            Self::Errors => "errors",
            Self::Export => "export",
            Self::Stats => "stats",
            Self::Debug => "debug",
            Self::Reset => "reset",
        }
    }

    /// One-line description for the help panel
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Help => "Display this command matrix",
            Self::Status => "Show system diagnostics",
            Self::Clear => "Clear terminal buffer",
            Self::History => "Show conversation log",
            Self::Errors => "Show error log viewer",
            Self::Export => "Export chat history",
            Self::Stats => "Usage statistics",
            Self::Debug => "Toggle debug mode",
            Self::Reset => "Reset neural interface",
        }
    }

    /// Match raw input: trimmed, case-insensitive, whole input only
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.keyword() == normalized)
    }
}

impl FromStr for LocalCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl fmt::Display for LocalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
