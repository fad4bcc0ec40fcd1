//! Address, count and sequence resolution for exec clauses.

use std::fmt;

use tracing::warn;

use crate::ir::{ControlFlow, Instruction};

/// A front-end supplied value that disagreed with the resolved one. The resolved value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveWarning {
    Addr { cf: usize, explicit: u32, resolved: u32 },
    Count { cf: usize, explicit: u32, resolved: u32 },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr {
                cf,
                explicit,
                resolved,
            } => write!(f, "invalid addr {explicit} at CF {cf} (resolved {resolved})"),
            Self::Count {
                cf,
                explicit,
                resolved,
            } => write!(f, "invalid cnt {explicit} at CF {cf} (resolved {resolved})"),
        }
    }
}

/// Build the sequence field of a clause: two bits per instruction with instruction 0 lowest.
pub fn sequence_bits(instrs: &[Instruction]) -> u32 {
    instrs.iter().rev().fold(0, |sequence, instr| {
        let mut bits = 0;
        if instr.is_fetch() {
            bits |= 0x1;
        }
        if instr.sync {
            bits |= 0x2;
        }
        (sequence << 2) | bits
    })
}

/// Assign addresses, counts and sequence bits to every exec clause, in place.
///
/// Instruction records follow the CF records, which are packed two nodes per record, so the
/// first clause starts at `ceil(cfs.len() / 2)`. Field widths are checked later, by the CF
/// encoder.
pub fn resolve(cfs: &mut [ControlFlow]) -> Vec<ResolveWarning> {
    let mut warnings = Vec::new();
    let mut addr = cfs.len().div_ceil(2) as u32;

    for (i, cf) in cfs.iter_mut().enumerate() {
        let Some(exec) = cf.exec_mut() else {
            continue;
        };
        let count = exec.instrs.len() as u32;

        if exec.addr != 0 && exec.addr != addr {
            warn!(cf = i, explicit = exec.addr, resolved = addr, "invalid exec addr");
            warnings.push(ResolveWarning::Addr {
                cf: i,
                explicit: exec.addr,
                resolved: addr,
            });
        }
        if exec.count != 0 && exec.count != count {
            warn!(cf = i, explicit = exec.count, resolved = count, "invalid exec cnt");
            warnings.push(ResolveWarning::Count {
                cf: i,
                explicit: exec.count,
                resolved: count,
            });
        }

        exec.addr = addr;
        exec.count = count;
        exec.sequence = sequence_bits(&exec.instrs);

        addr += count;
    }

    warnings
}
