//! ALU records: one vector op plus one (possibly filler) scalar op.
//!
//! ```text
//! dword0:  0..5   vector dst          dword1:  0..7   src3 swizzle
//!          8..13  scalar dst                   8..15  src2 swizzle
//!            15   export                      16..23  src1 swizzle
//!         16..19  vector write mask             24   src3 negate
//!         20..23  scalar write mask             25   src2 negate
//!         26..31  scalar opcode                 26   src1 negate
//!
//! dword2:  0..5   src3 reg      7  src3 abs
//!          8..13  src2 reg     15  src2 abs
//!         16..21  src1 reg     23  src1 abs
//!         24..28  vector opcode
//!         29/30/31 src3/src2/src1 select (1 = general register, 0 = constant)
//! ```

use tracing::trace;

use crate::arena::Arena;
use crate::encode::{swizzle_field, Operands, Record};
use crate::error::{AsmError, Location, Result};
use crate::ir::{AluInstr, RegFlags, Register};
use crate::opcodes::ScalarOpcode;
use crate::stats::ShaderInfo;
use crate::swizzle::{alu_dst_write_mask, alu_src_swizzle};

/// Scalar opcode emitted when the instruction has no scalar op.
pub const SCALAR_FILLER: ScalarOpcode = ScalarOpcode::Max;

/// Encoded fields of one source operand.
struct Src {
    reg: u32,
    swizzle: u32,
    negate: bool,
    abs: bool,
    select: bool,
}

impl Src {
    /// Unused src3 slot: everything zero but the register-bank select.
    const UNUSED: Self = Self {
        reg: 0,
        swizzle: 0,
        negate: false,
        abs: false,
        select: true,
    };

    fn encode(
        reg: &Register,
        arena: &Arena,
        location: Location,
        operand: &'static str,
    ) -> Result<Self> {
        if reg.flags.contains(RegFlags::EXPORT) {
            return Err(AsmError::IllegalFlags {
                location,
                operand,
                flags: reg.flags,
            });
        }
        Ok(Self {
            reg: reg.num,
            swizzle: swizzle_field(arena, reg, location, operand, alu_src_swizzle)?,
            negate: reg.flags.contains(RegFlags::NEGATE),
            abs: reg.flags.contains(RegFlags::ABS),
            select: !reg.flags.contains(RegFlags::CONST),
        })
    }

    /// Place the operand in source slot `slot` (1, 2 or 3).
    fn pack(&self, slot: u32, dwords: &mut Record) {
        // src3 occupies the lowest bits of each field group.
        let lane = 3 - slot;
        dwords[1] |= self.swizzle << (8 * lane);
        dwords[1] |= u32::from(self.negate) << (24 + lane);
        dwords[2] |= self.reg << (8 * lane);
        dwords[2] |= u32::from(self.abs) << (8 * lane + 7);
        dwords[2] |= u32::from(self.select) << (29 + lane);
    }
}

fn check_dst(reg: &Register, location: Location, operand: &'static str) -> Result<()> {
    if !(reg.flags - RegFlags::EXPORT).is_empty() {
        return Err(AsmError::IllegalFlags {
            location,
            operand,
            flags: reg.flags,
        });
    }
    Ok(())
}

fn same_operand(arena: &Arena, a: &Register, b: &Register) -> bool {
    a.num == b.num
        && a.flags == b.flags
        && a.swizzle.map(|s| arena.str(s)) == b.swizzle.map(|s| arena.str(s))
}

/// Encode an ALU instruction.
///
/// Operand order is `[dst, src1, src2]`, or `[dst, src3, src1, src2]` for `MULADDv`, followed by
/// `[scalar_dst, scalar_src]` when a scalar op is present. The scalar source shares the src3 slot,
/// so with `MULADDv` it must repeat the leading src3 operand.
pub fn encode_alu(
    alu: &AluInstr,
    regs: &[Register],
    arena: &Arena,
    info: &mut ShaderInfo,
    location: Location,
) -> Result<Record> {
    let mut operands = Operands::new(regs, location);
    let dst = operands.next("destination")?;
    let mut src3 = if alu.vector_opc.has_src3() {
        Some(operands.next("src3")?)
    } else {
        None
    };
    let src1 = operands.next("src1")?;
    let src2 = operands.next("src2")?;

    info.update(dst, true);
    info.update(src1, false);
    info.update(src2, false);

    check_dst(dst, location, "destination")?;

    let mut dwords = [0u32; 3];
    dwords[0] |= dst.num;
    dwords[0] |= u32::from(dst.flags.contains(RegFlags::EXPORT)) << 15;
    dwords[0] |= swizzle_field(arena, dst, location, "destination", alu_dst_write_mask)? << 16;
    dwords[2] |= alu.vector_opc.raw() << 24;

    Src::encode(src1, arena, location, "src1")?.pack(1, &mut dwords);
    Src::encode(src2, arena, location, "src2")?.pack(2, &mut dwords);

    match alu.scalar_opc {
        Some(scalar_opc) => {
            let scalar_dst = operands.next("scalar destination")?;
            info.update(scalar_dst, true);

            if scalar_dst.flags != dst.flags {
                return Err(AsmError::ScalarDestFlagsMismatch { location });
            }
            let scalar_src = operands.next("scalar source")?;
            let shared = *src3.get_or_insert(scalar_src);
            if !same_operand(arena, shared, scalar_src) {
                return Err(AsmError::ScalarSrc3Mismatch { location });
            }

            dwords[0] |= scalar_dst.num << 8;
            dwords[0] |= swizzle_field(
                arena,
                scalar_dst,
                location,
                "scalar destination",
                alu_dst_write_mask,
            )? << 20;
            dwords[0] |= scalar_opc.raw() << 26;
        }
        None => dwords[0] |= SCALAR_FILLER.raw() << 26,
    }
    operands.finish()?;

    match src3 {
        Some(src3) => {
            info.update(src3, false);
            Src::encode(src3, arena, location, "src3")?.pack(3, &mut dwords);
        }
        None => Src::UNUSED.pack(3, &mut dwords),
    }

    trace!(%location, ?dwords, "alu");
    Ok(dwords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::VectorOpcode;
    use pretty_assertions::assert_eq;

    const LOC: Location = Location::Instr { cf: 1, index: 2 };

    struct Regs {
        arena: Arena,
        regs: Vec<Register>,
    }

    impl Regs {
        fn new() -> Self {
            Self {
                arena: Arena::new(512),
                regs: Vec::new(),
            }
        }

        fn add(mut self, num: u32, swizzle: Option<&str>, flags: RegFlags) -> Self {
            let swizzle = self.arena.duplicate_string(swizzle).unwrap();
            self.regs.push(Register {
                num,
                swizzle,
                flags,
            });
            self
        }

        fn encode(&self, alu: AluInstr) -> Result<Record> {
            let mut info = ShaderInfo::default();
            encode_alu(&alu, &self.regs, &self.arena, &mut info, LOC)
        }
    }

    #[test]
    fn vector_only_uses_filler_scalar_and_src3_select() {
        // ADDv R2.xy__ = R0, C1.wzyx
        let regs = Regs::new()
            .add(2, Some("xy__"), RegFlags::empty())
            .add(0, None, RegFlags::empty())
            .add(1, Some("wzyx"), RegFlags::CONST);
        let dwords = regs.encode(AluInstr::new(VectorOpcode::Add)).unwrap();
        assert_eq!(dwords, [0x1403_0002, 0x0000_7700, 0xa000_0100]);
    }

    #[test]
    fn export_with_scalar_op() {
        // MULv export62 = R1, R2 + RECIP_IEEE export62.___w = R3.wwww
        let regs = Regs::new()
            .add(62, Some("xyz_"), RegFlags::EXPORT)
            .add(1, None, RegFlags::NEGATE)
            .add(2, None, RegFlags::ABS)
            .add(62, Some("___w"), RegFlags::EXPORT)
            .add(3, Some("wwww"), RegFlags::empty());
        let dwords = regs
            .encode(AluInstr::with_scalar(
                VectorOpcode::Mul,
                ScalarOpcode::RecipIeee,
            ))
            .unwrap();
        assert_eq!(dwords, [0x4c87_be3e, 0x0400_001b, 0xe101_8203]);
    }

    #[test]
    fn muladd_takes_src3_first() {
        // MULADDv R0 = R3 + R1 * R2
        let regs = Regs::new()
            .add(0, None, RegFlags::empty())
            .add(3, None, RegFlags::empty())
            .add(1, None, RegFlags::empty())
            .add(2, None, RegFlags::empty());
        let dwords = regs.encode(AluInstr::new(VectorOpcode::MulAdd)).unwrap();
        assert_eq!(dwords, [0x140f_0000, 0x0000_0000, 0xeb01_0203]);
    }

    #[test]
    fn muladd_scalar_source_must_repeat_src3() {
        let base = || {
            Regs::new()
                .add(0, None, RegFlags::empty())
                .add(3, Some("xxxx"), RegFlags::empty())
                .add(1, None, RegFlags::empty())
                .add(2, None, RegFlags::empty())
                .add(4, Some("x___"), RegFlags::empty())
        };
        let alu = AluInstr::with_scalar(VectorOpcode::MulAdd, ScalarOpcode::Mul);

        assert!(base().add(3, Some("xxxx"), RegFlags::empty()).encode(alu).is_ok());
        assert_eq!(
            base().add(3, Some("yyyy"), RegFlags::empty()).encode(alu),
            Err(AsmError::ScalarSrc3Mismatch { location: LOC })
        );
    }

    #[test]
    fn destination_rejects_source_modifiers() {
        let regs = Regs::new()
            .add(0, None, RegFlags::NEGATE)
            .add(1, None, RegFlags::empty())
            .add(2, None, RegFlags::empty());
        assert_eq!(
            regs.encode(AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::IllegalFlags {
                location: LOC,
                operand: "destination",
                flags: RegFlags::NEGATE
            })
        );
    }

    #[test]
    fn sources_reject_export() {
        let regs = Regs::new()
            .add(0, None, RegFlags::empty())
            .add(1, None, RegFlags::empty())
            .add(2, None, RegFlags::EXPORT);
        assert!(matches!(
            regs.encode(AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::IllegalFlags { operand: "src2", .. })
        ));
    }

    #[test]
    fn scalar_destination_flags_must_match() {
        let regs = Regs::new()
            .add(62, None, RegFlags::EXPORT)
            .add(1, None, RegFlags::empty())
            .add(2, None, RegFlags::empty())
            .add(3, None, RegFlags::empty())
            .add(4, None, RegFlags::empty());
        assert_eq!(
            regs.encode(AluInstr::with_scalar(VectorOpcode::Add, ScalarOpcode::Cos)),
            Err(AsmError::ScalarDestFlagsMismatch { location: LOC })
        );
    }

    #[test]
    fn operand_count_is_checked() {
        let short = Regs::new()
            .add(0, None, RegFlags::empty())
            .add(1, None, RegFlags::empty());
        assert_eq!(
            short.encode(AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::MissingOperand {
                location: LOC,
                operand: "src2"
            })
        );

        let long = short
            .add(2, None, RegFlags::empty())
            .add(3, None, RegFlags::empty());
        assert_eq!(
            long.encode(AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::UnexpectedOperands {
                location: LOC,
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn malformed_swizzles_are_rejected() {
        let regs = Regs::new()
            .add(0, Some("xyz"), RegFlags::empty())
            .add(1, None, RegFlags::empty())
            .add(2, None, RegFlags::empty());
        assert!(matches!(
            regs.encode(AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::Swizzle { operand: "destination", .. })
        ));
    }

    #[test]
    fn stats_follow_operand_order() {
        // R0 = R0 * R1: R0 is written before it is read, so only R1 counts as an input.
        let regs = Regs::new()
            .add(0, None, RegFlags::empty())
            .add(0, None, RegFlags::empty())
            .add(1, None, RegFlags::empty());
        let mut info = ShaderInfo::default();
        encode_alu(
            &AluInstr::new(VectorOpcode::Mul),
            &regs.regs,
            &regs.arena,
            &mut info,
            LOC,
        )
        .unwrap();
        assert_eq!(info.max_input_reg, 1);
        assert_eq!(info.max_reg, 1);
        assert_eq!(info.regs_written, 0b1);
    }
}
