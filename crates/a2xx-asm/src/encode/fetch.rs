//! Vertex and texture fetch records.
//!
//! ```text
//! dword0:  0..4   fetch opcode
//!          5..10  src register
//!         12..17  dst register
//!         20..23  fetch constant
//!         25..26  src swizzle (vertex, 1 component)
//!         26..31  src swizzle (texture, 3 components)
//! dword1:  0..11  dst swizzle/mask, 3 bits per component
//!            12   signed (vertex)
//!         16..21  format (vertex)
//! dword2:  0..15  stride (vertex)
//! ```
//!
//! The remaining bits set below have no known meaning but are required by the hardware. Vertex
//! and texture fetches use different sets.

use tracing::trace;

use crate::arena::Arena;
use crate::encode::{check_field, swizzle_field, Operands, Record};
use crate::error::{AsmError, Location, Result};
use crate::ir::{FetchInstr, Register, Signedness};
use crate::limits::{FETCH_CONST_MASK, VTX_FORMAT_MASK, VTX_STRIDE_MASK};
use crate::opcodes::FetchOpcode;
use crate::stats::ShaderInfo;
use crate::swizzle::{fetch_dst_swizzle, fetch_src_swizzle};

fn check_no_flags(reg: &Register, location: Location, operand: &'static str) -> Result<()> {
    if !reg.flags.is_empty() {
        return Err(AsmError::IllegalFlags {
            location,
            operand,
            flags: reg.flags,
        });
    }
    Ok(())
}

/// Encode a fetch. Operands are `[dst, src]`; `idx` is the instruction's position in the
/// program.
pub fn encode_fetch(
    fetch: &FetchInstr,
    regs: &[Register],
    arena: &Arena,
    idx: usize,
    info: &mut ShaderInfo,
    location: Location,
) -> Result<Record> {
    let mut operands = Operands::new(regs, location);
    let dst = operands.next("destination")?;
    let src = operands.next("source")?;
    operands.finish()?;

    check_no_flags(dst, location, "destination")?;
    check_no_flags(src, location, "source")?;
    let constant = check_field(location, "fetch constant", fetch.constant, FETCH_CONST_MASK)?;

    info.update(dst, true);
    info.update(src, false);

    let mut dwords = [0u32; 3];
    dwords[0] |= fetch.opc.raw();
    dwords[0] |= src.num << 5;
    dwords[0] |= dst.num << 12;
    dwords[0] |= constant << 20;
    dwords[1] |= swizzle_field(arena, dst, location, "destination", fetch_dst_swizzle)?;

    match fetch.opc {
        FetchOpcode::Vertex => {
            let stride = check_field(location, "stride", fetch.stride, VTX_STRIDE_MASK)?;
            let format = check_field(location, "format", fetch.format, VTX_FORMAT_MASK)?;

            dwords[0] |= swizzle_field(arena, src, location, "source", |s| {
                fetch_src_swizzle(s, 1)
            })? << 25;
            dwords[1] |= u32::from(fetch.sign == Signedness::Signed) << 12;
            dwords[1] |= format << 16;
            dwords[2] |= stride;

            dwords[0] |= 0x1 << 19;
            dwords[0] |= 0x1 << 24;
            dwords[0] |= 0x1 << 28;
            // Clear only for internal GMEM->MEM blit shaders.
            dwords[1] |= 0x1 << 13;
            // Differs between the first instruction of the program and all the others.
            if idx > 0 {
                dwords[1] |= 0x1 << 30;
            } else {
                dwords[0] |= 0x1 << 27;
            }
        }
        FetchOpcode::Sample => {
            dwords[0] |= swizzle_field(arena, src, location, "source", |s| {
                fetch_src_swizzle(s, 3)
            })? << 26;

            dwords[1] |= 0x1ffff << 12;
            dwords[2] |= 0x1 << 1;
        }
    }

    trace!(%location, ?dwords, "fetch");
    Ok(dwords)
}
