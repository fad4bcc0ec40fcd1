//! Binary encoders for CF pairs and ALU/fetch instructions.
//!
//! Every record is three dwords. The encoders only read the IR; register statistics are
//! accumulated into the caller's [`ShaderInfo`].

pub mod alu;
pub mod cf;
pub mod fetch;

use crate::arena::Arena;
use crate::error::{AsmError, Location, Result};
use crate::ir::{InstrKind, Instruction, Register};
use crate::stats::ShaderInfo;
use crate::swizzle::SwizzleError;

pub use alu::encode_alu;
pub use cf::encode_cf_pair;
pub use fetch::encode_fetch;

/// Dwords per CF pair or instruction record.
pub const RECORD_DWORDS: usize = 3;

pub type Record = [u32; RECORD_DWORDS];

/// Reject `value` if it does not fit under `max`.
pub(crate) fn check_field(
    location: Location,
    field: &'static str,
    value: u32,
    max: u32,
) -> Result<u32> {
    if value > max {
        return Err(AsmError::FieldOverflow {
            location,
            field,
            value,
            max,
        });
    }
    Ok(value)
}

/// Cursor over an instruction's operand list.
pub(crate) struct Operands<'a> {
    regs: &'a [Register],
    next: usize,
    location: Location,
}

impl<'a> Operands<'a> {
    pub(crate) fn new(regs: &'a [Register], location: Location) -> Self {
        Self {
            regs,
            next: 0,
            location,
        }
    }

    pub(crate) fn next(&mut self, operand: &'static str) -> Result<&'a Register> {
        let reg = self.regs.get(self.next).ok_or(AsmError::MissingOperand {
            location: self.location,
            operand,
        })?;
        self.next += 1;
        Ok(reg)
    }

    /// Fail if the instruction carries operands its form does not consume.
    pub(crate) fn finish(self) -> Result<()> {
        if self.next != self.regs.len() {
            return Err(AsmError::UnexpectedOperands {
                location: self.location,
                expected: self.next,
                found: self.regs.len(),
            });
        }
        Ok(())
    }
}

/// Run a swizzle codec on `reg`, attaching the operand position to any error.
pub(crate) fn swizzle_field(
    arena: &Arena,
    reg: &Register,
    location: Location,
    operand: &'static str,
    codec: impl FnOnce(Option<&str>) -> std::result::Result<u32, SwizzleError>,
) -> Result<u32> {
    let swizzle = reg
        .swizzle
        .map(|s| arena.str(s).ok_or(AsmError::InvalidHandle))
        .transpose()?;
    codec(swizzle).map_err(|source| AsmError::Swizzle {
        location,
        operand,
        source,
    })
}

/// Encode one instruction. `idx` is its zero-based position in the whole program.
pub fn encode_instr(
    instr: &Instruction,
    arena: &Arena,
    idx: usize,
    info: &mut ShaderInfo,
    location: Location,
) -> Result<Record> {
    match &instr.kind {
        InstrKind::Fetch(fetch) => encode_fetch(fetch, instr.regs(), arena, idx, info, location),
        InstrKind::Alu(alu) => encode_alu(alu, instr.regs(), arena, info, location),
    }
}
