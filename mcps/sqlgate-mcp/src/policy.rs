//! Query policy - prefix-based gate in front of the database
//!
//! Each tool only accepts queries whose leading keyword belongs to its
//! operation class. This is a textual check on the trimmed, uppercased
//! query, not a SQL parse: there is no word boundary, so `CREATED_AT ...`
//! passes a `CREATE` prefix, and anything after the first keyword
//! (subqueries, chained statements) is not inspected here. Backends refuse
//! a read that holds more than one statement.

use crate::types::GateError;

const READ_PREFIXES: &[&str] = &["SELECT"];
const SCHEMA_PREFIXES: &[&str] = &["CREATE", "DROP", "ALTER"];
const MODIFY_PREFIXES: &[&str] = &["INSERT", "UPDATE", "DELETE"];

/// Returns true if the normalized query starts with any allowed prefix.
///
/// Prefixes are expected in uppercase.
pub fn classify(query: &str, allowed_prefixes: &[&str]) -> bool {
    let normalized = query.trim().to_uppercase();
    allowed_prefixes
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// Operation class of a tool, each with a fixed allowed-keyword set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    /// Row-returning queries
    Read,
    /// DDL statements
    Schema,
    /// DML statements
    Modify,
}

impl OperationClass {
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            OperationClass::Read => READ_PREFIXES,
            OperationClass::Schema => SCHEMA_PREFIXES,
            OperationClass::Modify => MODIFY_PREFIXES,
        }
    }

    /// Human-readable list of allowed keywords, e.g. "CREATE, DROP, or ALTER"
    pub fn allowed_keywords(&self) -> String {
        match self.prefixes() {
            [] => String::new(),
            [only] => (*only).to_string(),
            [init @ .., last] => format!("{}, or {}", init.join(", "), last),
        }
    }

    pub fn allows(&self, query: &str) -> bool {
        classify(query, self.prefixes())
    }

    /// Reject the query unless it is allowed for this class
    pub fn check(&self, query: &str) -> Result<(), GateError> {
        if self.allows(query) {
            Ok(())
        } else {
            Err(GateError::PolicyRejected {
                allowed: self.allowed_keywords(),
            })
        }
    }
}
