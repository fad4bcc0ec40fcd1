//! CF records pack two control-flow nodes into three dwords:
//!
//! ```text
//! dword0:  0..11  addr/size 1
//!         12..15  count 1
//!         16..31  sequence 1
//! dword1:  8..11  alloc type 1
//!         12..15  op 1
//!         16..27  addr/size 2
//!         28..31  count 2
//! dword2:  0..15  sequence 2
//!         24..27  alloc type 2
//!         28..31  op 2
//! ```

use crate::encode::{check_field, Record};
use crate::error::{Location, Result};
use crate::ir::{Alloc, AllocType, ControlFlow, ExecClause};
use crate::limits::{ADDR_MASK, COUNT_MASK, SEQUENCE_MASK};

const OP1_SHIFT: u32 = 12;
const OP2_SHIFT: u32 = 28;

/// Fields of one CF node, already range checked.
enum Fields {
    None,
    Exec { addr: u32, count: u32, sequence: u32 },
    Alloc { size: u32, ty: u32 },
}

fn alloc_type(ty: AllocType) -> u32 {
    match ty {
        AllocType::Coord => 0x2,
        AllocType::Parameter => 0x4,
    }
}

fn exec_fields(exec: &ExecClause, location: Location) -> Result<Fields> {
    Ok(Fields::Exec {
        addr: check_field(location, "addr", exec.addr(), ADDR_MASK)?,
        count: check_field(location, "count", exec.count(), COUNT_MASK)?,
        sequence: check_field(location, "sequence", exec.sequence(), SEQUENCE_MASK)?,
    })
}

fn alloc_fields(alloc: &Alloc, location: Location) -> Result<Fields> {
    Ok(Fields::Alloc {
        size: check_field(location, "alloc size", alloc.size, ADDR_MASK)?,
        ty: alloc_type(alloc.ty),
    })
}

fn fields(cf: &ControlFlow, index: usize) -> Result<Fields> {
    let location = Location::Cf { index };
    match cf {
        ControlFlow::Nop => Ok(Fields::None),
        ControlFlow::Exec(exec) | ControlFlow::ExecEnd(exec) => exec_fields(exec, location),
        ControlFlow::Alloc(alloc) => alloc_fields(alloc, location),
    }
}

/// Encode the CF pair starting at `index`. Both nodes must have been resolved.
pub fn encode_cf_pair(cf1: &ControlFlow, cf2: &ControlFlow, index: usize) -> Result<Record> {
    let mut dwords = [0u32; 3];

    dwords[1] |= cf1.cf_type().raw() << OP1_SHIFT;
    dwords[2] |= cf2.cf_type().raw() << OP2_SHIFT;

    match fields(cf1, index)? {
        Fields::None => {}
        Fields::Exec {
            addr,
            count,
            sequence,
        } => {
            dwords[0] |= addr;
            dwords[0] |= count << 12;
            dwords[0] |= sequence << 16;
        }
        Fields::Alloc { size, ty } => {
            dwords[0] |= size;
            dwords[1] |= ty << 8;
        }
    }

    match fields(cf2, index + 1)? {
        Fields::None => {}
        Fields::Exec {
            addr,
            count,
            sequence,
        } => {
            dwords[1] |= addr << 16;
            dwords[1] |= count << 28;
            dwords[2] |= sequence;
        }
        Fields::Alloc { size, ty } => {
            dwords[1] |= size << 16;
            dwords[2] |= ty << 24;
        }
    }

    Ok(dwords)
}
