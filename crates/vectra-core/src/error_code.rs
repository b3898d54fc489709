//! Stable diagnostic codes.
//!
//! Every diagnostic carries an [`ErrorCode`]. The numeric value is stable
//! across releases; the high byte groups codes by the phase that reports them.

use std::fmt;

use crate::Severity;

/// Diagnostic code reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ErrorCode {
    // =========================================================================
    // General
    // =========================================================================
    InternalError = 0x0001,

    // =========================================================================
    // Binding
    // =========================================================================
    DuplicateSymbol = 0x3001,
    UnsupportedNode = 0x3002,
    TypeNotFound = 0x3003,
    IdentifierNotFound = 0x3004,
    TypeMismatch = 0x3005,
    UnableToInferType = 0x3006,
    InvalidOperator = 0x3007,
    CannotFindConstructor = 0x3008,
    UnknownMember = 0x3009,
    TargetNotCallable = 0x300A,
    IllegalStatement = 0x300B,
    VariableAlreadyDeclared = 0x300C,
    NoMatchingOverload = 0x300D,
    IllegalAccess = 0x300E,

    // =========================================================================
    // Analysis
    // =========================================================================
    MissingReturnPath = 0x4001,
    UseOfUninitializedVariable = 0x4002,
    UnreachableCode = 0x4003,
    UnusedVariable = 0x4004,
    UnusedParameter = 0x4005,

    // =========================================================================
    // Emission
    // =========================================================================
    ArtifactWriteFailed = 0x6001,
}

impl ErrorCode {
    /// Numeric value of the code.
    #[inline]
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Severity the backend reports this code with unless stated otherwise.
    pub fn default_severity(self) -> Severity {
        match self {
            ErrorCode::UnreachableCode | ErrorCode::UnusedVariable | ErrorCode::UnusedParameter => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Short human readable title.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InternalError => "internal compiler error",
            ErrorCode::DuplicateSymbol => "duplicate symbol",
            ErrorCode::UnsupportedNode => "unsupported construct",
            ErrorCode::TypeNotFound => "type not found",
            ErrorCode::IdentifierNotFound => "identifier not found",
            ErrorCode::TypeMismatch => "type mismatch",
            ErrorCode::UnableToInferType => "unable to infer type",
            ErrorCode::InvalidOperator => "invalid operator",
            ErrorCode::CannotFindConstructor => "cannot find constructor",
            ErrorCode::UnknownMember => "unknown member",
            ErrorCode::TargetNotCallable => "target not callable",
            ErrorCode::IllegalStatement => "illegal statement",
            ErrorCode::VariableAlreadyDeclared => "variable already declared",
            ErrorCode::NoMatchingOverload => "no matching overload",
            ErrorCode::IllegalAccess => "illegal access",
            ErrorCode::MissingReturnPath => "missing return path",
            ErrorCode::UseOfUninitializedVariable => "use of uninitialized variable",
            ErrorCode::UnreachableCode => "unreachable code",
            ErrorCode::UnusedVariable => "unused variable",
            ErrorCode::UnusedParameter => "unused parameter",
            ErrorCode::ArtifactWriteFailed => "artifact write failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VEC{:04X}", self.value())
    }
}
