//! Shader IR entities: control-flow nodes, instructions, register operands and reflection
//! metadata. All of them are owned by a [`crate::Shader`] and only reachable through it.

use bitflags::bitflags;

use crate::arena::ArenaStr;
use crate::opcodes::{CfType, FetchOpcode, ScalarOpcode, VectorOpcode};

bitflags! {
    /// Operand modifiers.
    ///
    /// Which combinations are legal depends on the operand position and is checked when the
    /// instruction is encoded, not when the register is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegFlags: u32 {
        /// Read from the constant file instead of the general register file.
        const CONST = 1 << 0;
        const NEGATE = 1 << 1;
        const ABS = 1 << 2;
        /// Destination is an export to a fixed-function stage. Destination only.
        const EXPORT = 1 << 3;
    }
}

/// Handle to a control-flow node of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfId(pub(crate) usize);

impl CfId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to an instruction inside an exec clause of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrId {
    pub(crate) cf: usize,
    pub(crate) index: usize,
}

impl InstrId {
    pub fn cf(self) -> CfId {
        CfId(self.cf)
    }

    /// Position of the instruction within its clause.
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Nop,
    Exec(ExecClause),
    ExecEnd(ExecClause),
    Alloc(Alloc),
}

impl ControlFlow {
    pub fn new(cf_type: CfType) -> Self {
        match cf_type {
            CfType::Nop => Self::Nop,
            CfType::Exec => Self::Exec(ExecClause::default()),
            CfType::ExecEnd => Self::ExecEnd(ExecClause::default()),
            CfType::Alloc => Self::Alloc(Alloc::default()),
        }
    }

    pub fn cf_type(&self) -> CfType {
        match self {
            Self::Nop => CfType::Nop,
            Self::Exec(_) => CfType::Exec,
            Self::ExecEnd(_) => CfType::ExecEnd,
            Self::Alloc(_) => CfType::Alloc,
        }
    }

    pub fn exec(&self) -> Option<&ExecClause> {
        match self {
            Self::Exec(exec) | Self::ExecEnd(exec) => Some(exec),
            _ => None,
        }
    }

    pub fn exec_mut(&mut self) -> Option<&mut ExecClause> {
        match self {
            Self::Exec(exec) | Self::ExecEnd(exec) => Some(exec),
            _ => None,
        }
    }

    pub fn alloc(&self) -> Option<&Alloc> {
        match self {
            Self::Alloc(alloc) => Some(alloc),
            _ => None,
        }
    }

    pub fn alloc_mut(&mut self) -> Option<&mut Alloc> {
        match self {
            Self::Alloc(alloc) => Some(alloc),
            _ => None,
        }
    }
}

/// Instruction clause of an `EXEC`/`EXEC_END` node.
///
/// `addr`, `count` and `sequence` are written by the resolver during assembly. A front end may
/// preset `addr`/`count` from its source; the resolver reports a mismatch and overwrites them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecClause {
    pub(crate) instrs: Vec<Instruction>,
    pub(crate) addr: u32,
    pub(crate) count: u32,
    pub(crate) sequence: u32,
}

impl ExecClause {
    pub fn instrs(&self) -> &[Instruction] {
        &self.instrs
    }

    /// Start address of the clause in instruction records.
    pub fn addr(&self) -> u32 {
        self.addr
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Two bits per instruction, instruction 0 in the low bits: bit 0 marks a fetch, bit 1 a
    /// serialized (`sync`) instruction.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn set_explicit_addr(&mut self, addr: u32) {
        self.addr = addr;
    }

    pub fn set_explicit_count(&mut self, count: u32) {
        self.count = count;
    }
}

/// Resource targeted by an `ALLOC` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AllocType {
    /// Position/coordinate export.
    #[default]
    Coord,
    /// Parameter (varying) or pixel export.
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alloc {
    pub size: u32,
    pub ty: AllocType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstrKind,
    /// Serialize: wait for outstanding results before issuing this instruction.
    pub sync: bool,
    pub(crate) regs: Vec<Register>,
}

impl Instruction {
    pub fn new(kind: impl Into<InstrKind>) -> Self {
        Self {
            kind: kind.into(),
            sync: false,
            regs: Vec::new(),
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self.kind, InstrKind::Fetch(_))
    }

    /// Operands in builder order; see the encoders for the per-opcode layout.
    pub fn regs(&self) -> &[Register] {
        &self.regs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrKind {
    Fetch(FetchInstr),
    Alu(AluInstr),
}

impl From<FetchInstr> for InstrKind {
    fn from(fetch: FetchInstr) -> Self {
        Self::Fetch(fetch)
    }
}

impl From<AluInstr> for InstrKind {
    fn from(alu: AluInstr) -> Self {
        Self::Alu(alu)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signedness {
    #[default]
    Unsigned,
    Signed,
}

/// Vertex fetch or texture sample. Operands are `[dst, src]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchInstr {
    pub opc: FetchOpcode,
    /// Fetch constant (vertex buffer / texture slot), 0..=15.
    pub constant: u32,
    pub sign: Signedness,
    /// Surface format code (vertex fetch only).
    pub format: u32,
    /// Vertex stride in bytes (vertex fetch only).
    pub stride: u32,
}

impl FetchInstr {
    pub fn new(opc: FetchOpcode) -> Self {
        Self {
            opc,
            constant: 0,
            sign: Signedness::Unsigned,
            format: 0,
            stride: 0,
        }
    }

    pub fn vertex(constant: u32, format: u32, stride: u32) -> Self {
        Self {
            constant,
            format,
            stride,
            ..Self::new(FetchOpcode::Vertex)
        }
    }

    pub fn sample(constant: u32) -> Self {
        Self {
            constant,
            ..Self::new(FetchOpcode::Sample)
        }
    }
}

/// Vector op with an optional co-issued scalar op.
///
/// Operands are `[dst, src1, src2]`, with `src3` inserted after `dst` for `MULADDv`, followed by
/// `[scalar_dst, scalar_src]` when `scalar_opc` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AluInstr {
    pub vector_opc: VectorOpcode,
    pub scalar_opc: Option<ScalarOpcode>,
}

impl AluInstr {
    pub fn new(vector_opc: VectorOpcode) -> Self {
        Self {
            vector_opc,
            scalar_opc: None,
        }
    }

    pub fn with_scalar(vector_opc: VectorOpcode, scalar_opc: ScalarOpcode) -> Self {
        Self {
            vector_opc,
            scalar_opc: Some(scalar_opc),
        }
    }
}

/// Register operand. Bound to a hardware field only when its instruction is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub num: u32,
    pub swizzle: Option<ArenaStr>,
    pub flags: RegFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Option<ArenaStr>,
    pub rstart: u32,
    pub num: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uniform {
    pub name: Option<ArenaStr>,
    pub cstart: u32,
    pub num: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sampler {
    pub name: Option<ArenaStr>,
    pub idx: u32,
}

/// Immediate constant loaded into `C{cstart}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Const {
    pub cstart: u32,
    pub val: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Varying {
    pub name: Option<ArenaStr>,
    pub rstart: u32,
    pub num: u32,
}
