//! Type definitions for SQL gate MCP

use std::fmt;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Phase of a database call, used to prefix wrapped driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Running a row-returning query
    Query,
    /// Running a statement for its side effect
    Execution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Query => write!(f, "query"),
            Phase::Execution => write!(f, "execution"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    /// Leading keyword is outside the operation's allowed set
    #[error("only {allowed} queries are allowed")]
    PolicyRejected { allowed: String },

    /// The database refused or failed to run the SQL
    #[error("{phase} failed: {message}")]
    ExecutionFailed { phase: Phase, message: String },

    /// Column metadata or row values could not be read
    #[error("failed to read query results: {0}")]
    ResultReadFailed(String),
}
