//! Binder configuration.

/// How a call site picks among methods of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverloadResolution {
    /// Only a candidate whose arity matches the call is accepted; otherwise
    /// `NoMatchingOverload` is reported.
    #[default]
    Exact,
    /// Without an arity match the first declared candidate is used. Argument
    /// type checks still apply to the chosen candidate.
    FirstCandidate,
}

#[derive(Debug, Clone, Default)]
pub struct BindOptions {
    pub overload_resolution: OverloadResolution,
}

impl BindOptions {
    pub fn with_overload_resolution(mut self, policy: OverloadResolution) -> Self {
        self.overload_resolution = policy;
        self
    }
}
