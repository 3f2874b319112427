use std::fmt;

use crate::response::{AddPointRequest, NewBlueprintRequest};

/// Capabilities a token can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Read,
    Write,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "blueprints.read",
            Scope::Write => "blueprints.write",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protected blueprint operation as received from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListAll,
    ListByAuthor {
        author: String,
    },
    GetOne {
        author: String,
        name: String,
    },
    Create(NewBlueprintRequest),
    AddPoint {
        author: String,
        name: String,
        point: AddPointRequest,
    },
}

impl Operation {
    /// The one scope a caller needs to run this operation
    pub fn required_scope(&self) -> Scope {
        match self {
            Operation::ListAll | Operation::ListByAuthor { .. } | Operation::GetOne { .. } => {
                Scope::Read
            }
            Operation::Create(_) | Operation::AddPoint { .. } => Scope::Write,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListAll => "list_all",
            Operation::ListByAuthor { .. } => "list_by_author",
            Operation::GetOne { .. } => "get_one",
            Operation::Create(_) => "create",
            Operation::AddPoint { .. } => "add_point",
        }
    }
}
