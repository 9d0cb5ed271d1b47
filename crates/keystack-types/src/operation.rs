use crate::error::TypesError;
use crate::Felt;
use std::fmt;
use std::str::FromStr;

/// Name of a stack operation, without its arguments.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OperationKind {
    Empty,
    Push,
    Pop,
    Peek,
    Search,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Empty,
        OperationKind::Push,
        OperationKind::Pop,
        OperationKind::Peek,
        OperationKind::Search,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Empty => "empty",
            OperationKind::Push => "push",
            OperationKind::Pop => "pop",
            OperationKind::Peek => "peek",
            OperationKind::Search => "search",
        }
    }

    /// Whether a committed execution may change durable state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, OperationKind::Push | OperationKind::Pop)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(OperationKind::Empty),
            "push" => Ok(OperationKind::Push),
            "pop" => Ok(OperationKind::Pop),
            "peek" => Ok(OperationKind::Peek),
            "search" => Ok(OperationKind::Search),
            other => Err(TypesError::UnknownOperation(other.to_string())),
        }
    }
}

/// A stack operation together with its value argument.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Empty,
    Push(Felt),
    Pop,
    Peek,
    Search(Felt),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Empty => OperationKind::Empty,
            Operation::Push(_) => OperationKind::Push,
            Operation::Pop => OperationKind::Pop,
            Operation::Peek => OperationKind::Peek,
            Operation::Search(_) => OperationKind::Search,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Push(v) | Operation::Search(v) => write!(f, "{}({})", self.kind(), v),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// Result of a successful operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    IsEmpty(bool),
    Pushed,
    Popped(Felt),
    Peeked(Felt),
    Contains(bool),
}

impl Outcome {
    pub fn kind(&self) -> OperationKind {
        match self {
            Outcome::IsEmpty(_) => OperationKind::Empty,
            Outcome::Pushed => OperationKind::Push,
            Outcome::Popped(_) => OperationKind::Pop,
            Outcome::Peeked(_) => OperationKind::Peek,
            Outcome::Contains(_) => OperationKind::Search,
        }
    }
}
