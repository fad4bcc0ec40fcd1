//! Hardware-imposed limits and field widths for a2xx shader programs.
//!
//! Collection capacities are enforced when entities are created; field masks are enforced when
//! the binary records are packed. Exceeding either is reported as an error, never truncated.

/// Maximum number of control-flow nodes in one shader (including NOP padding).
pub const MAX_CF: usize = 0x56;

/// Maximum number of instructions in one `EXEC`/`EXEC_END` clause.
pub const MAX_INSTRS_PER_EXEC: usize = 6;

/// Maximum number of register operands attached to one instruction.
///
/// The longest legal form is `MULADDv` with a scalar op: dst, src3, src1, src2, scalar dst and the
/// repeated src3.
pub const MAX_REGS_PER_INSTR: usize = 6;

pub const MAX_ATTRIBUTES: usize = 16;
pub const MAX_CONSTS: usize = 32;
pub const MAX_SAMPLERS: usize = 16;
pub const MAX_UNIFORMS: usize = 32;
pub const MAX_VARYINGS: usize = 32;

/// Highest addressable register index (6-bit register fields).
pub const MAX_REGISTER: u32 = 0x3f;

/// Control-flow address / `ALLOC` size field (12 bits).
pub const ADDR_MASK: u32 = 0xfff;

/// Control-flow instruction count field (4 bits).
pub const COUNT_MASK: u32 = 0xf;

/// Control-flow sequence field (2 bits per instruction, 16 bits).
pub const SEQUENCE_MASK: u32 = 0xffff;

/// Fetch constant-bank index (4 bits).
pub const FETCH_CONST_MASK: u32 = 0xf;

/// Vertex fetch format code (6 bits).
pub const VTX_FORMAT_MASK: u32 = 0x3f;

/// Vertex fetch stride. The field is wider, but strides above `0xff` make the hardware repack
/// the data.
pub const VTX_STRIDE_MASK: u32 = 0xff;

/// Default size of the per-shader arena in bytes.
pub const DEFAULT_HEAP_SIZE: usize = 100 * 4096;
