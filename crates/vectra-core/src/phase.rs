//! Pipeline phases.

use std::fmt;

/// A stage of the backend pipeline.
///
/// Phases run strictly in declaration order. The phase is passed explicitly
/// wherever it is needed for diagnostic or log tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Bind,
    Analyze,
    Lower,
    Emit,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Bind, Phase::Analyze, Phase::Lower, Phase::Emit];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Bind => "bind",
            Phase::Analyze => "analyze",
            Phase::Lower => "lower",
            Phase::Emit => "emit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
