use crate::ir::{RegFlags, Register};

/// Register usage summary consumed by the thread scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderInfo {
    /// Highest general register read or written, or -1 if none.
    pub max_reg: i32,
    /// Highest general register read before any write, i.e. an inferred shader input.
    pub max_input_reg: u32,
    /// Bit `n` is set once register `n` has been written.
    pub regs_written: u64,
}

impl Default for ShaderInfo {
    fn default() -> Self {
        Self {
            max_reg: -1,
            max_input_reg: 0,
            regs_written: 0,
        }
    }
}

impl ShaderInfo {
    /// Account for one operand, in program order. Constant and export operands do not touch the
    /// general register file.
    pub(crate) fn update(&mut self, reg: &Register, dest: bool) {
        if reg.flags.intersects(RegFlags::CONST | RegFlags::EXPORT) {
            return;
        }
        let bit = 1u64 << reg.num;
        self.max_reg = self.max_reg.max(reg.num as i32);
        if dest {
            self.regs_written |= bit;
        } else if self.regs_written & bit == 0 {
            self.max_input_reg = self.max_input_reg.max(reg.num);
        }
    }

    pub fn is_written(&self, num: u32) -> bool {
        num < 64 && self.regs_written & (1u64 << num) != 0
    }
}
