use std::fmt;

use thiserror::Error;

use crate::ir::RegFlags;
use crate::swizzle::SwizzleError;

pub type Result<T> = std::result::Result<T, AsmError>;

/// Position of the entity an encoding error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Cf { index: usize },
    Instr { cf: usize, index: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cf { index } => write!(f, "CF {index}"),
            Self::Instr { cf, index } => write!(f, "CF {cf} instruction {index}"),
        }
    }
}

/// Error type for shader construction and assembly.
///
/// Every variant is fatal for the current operation. Builder failures leave the shader without
/// the rejected entity; assembly failures write nothing to the output buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("too many {what} (limit {limit})")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("shader arena exhausted: requested {requested} bytes, {remaining} remaining")]
    ArenaExhausted { requested: usize, remaining: usize },

    #[error("register index {num} out of range (max {max})")]
    RegisterOutOfRange { num: u32, max: u32 },

    #[error("handle does not refer to an entity of this shader")]
    InvalidHandle,

    #[error("CF {cf} is not an EXEC/EXEC_END clause")]
    NotExecClause { cf: usize },

    #[error("unknown {kind} opcode {value:#x}")]
    UnknownOpcode { kind: &'static str, value: u32 },

    #[error("output buffer too small: need {needed} dwords, have {capacity}")]
    OutputTooSmall { needed: usize, capacity: usize },

    #[error("{location}: {field} value {value:#x} exceeds {max:#x}")]
    FieldOverflow {
        location: Location,
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{location}: missing {operand} operand")]
    MissingOperand {
        location: Location,
        operand: &'static str,
    },

    #[error("{location}: expected {expected} operands, found {found}")]
    UnexpectedOperands {
        location: Location,
        expected: usize,
        found: usize,
    },

    #[error("{location}: illegal flags {flags:?} on {operand} operand")]
    IllegalFlags {
        location: Location,
        operand: &'static str,
        flags: RegFlags,
    },

    #[error("{location}: scalar destination flags differ from vector destination flags")]
    ScalarDestFlagsMismatch { location: Location },

    #[error("{location}: scalar source differs from the MULADDv third source")]
    ScalarSrc3Mismatch { location: Location },

    #[error("{location}: {operand} operand: {source}")]
    Swizzle {
        location: Location,
        operand: &'static str,
        #[source]
        source: SwizzleError,
    },
}
