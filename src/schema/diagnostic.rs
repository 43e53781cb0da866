/// Non-fatal conditions recorded while compiling or playing a script.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable problem. Fatal problems are errors instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// A line began with a known sigil but did not fit its grammar.
    MalformedLine { line: String },
    /// A line inside a `char` or `transition` block matched no sub-command.
    UnknownCommand { lang: String, line: String },
    /// The player reached an event it does not execute.
    UnrecognizedEvent { scene: String, kind: String },
    /// A choice prompt received out-of-range or non-numeric input.
    InvalidSelection { input: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine { line } => write!(f, "malformed line dropped: '{}'", line),
            Self::UnknownCommand { lang, line } => {
                write!(f, "unknown {} command: '{}'", lang, line)
            }
            Self::UnrecognizedEvent { scene, kind } => {
                write!(f, "unrecognized {} event skipped in scene '{}'", kind, scene)
            }
            Self::InvalidSelection { input } => write!(f, "invalid selection: '{}'", input),
        }
    }
}
