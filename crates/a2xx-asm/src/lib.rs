//! IR and assembler for the Adreno a2xx shader instruction set.
//!
//! A front end builds a [`Shader`] through the builder methods (control-flow nodes, instructions,
//! register operands and reflection metadata), then calls [`Shader::assemble`], which:
//!
//! 1. pads the control-flow list to an even length with a `NOP`,
//! 2. resolves clause addresses, counts and sequence bits ([`resolve`]),
//! 3. packs CF pairs and then every ALU/fetch instruction into 3-dword records ([`encode`]),
//!
//! and reports the register usage ([`ShaderInfo`]) the thread scheduler needs.
//!
//! ```
//! use a2xx_asm::{AluInstr, CfType, RegFlags, Shader, VectorOpcode};
//!
//! let mut shader = Shader::new();
//! let exec = shader.cf_create(CfType::ExecEnd)?;
//! let mov = shader.instr_create(exec, AluInstr::new(VectorOpcode::Max))?;
//! shader.reg_create(mov, 0, None, RegFlags::EXPORT)?;
//! shader.reg_create(mov, 0, None, RegFlags::empty())?;
//! shader.reg_create(mov, 0, None, RegFlags::empty())?;
//!
//! let (dwords, assembly) = shader.assemble_to_vec()?;
//! assert_eq!(dwords.len(), 6);
//! assert_eq!(assembly.info.max_input_reg, 0);
//! # Ok::<(), a2xx_asm::AsmError>(())
//! ```

#![forbid(unsafe_code)]

pub mod arena;
mod assemble;
mod builder;
pub mod config;
pub mod encode;
mod error;
pub mod ir;
pub mod limits;
pub mod opcodes;
pub mod resolve;
mod stats;
pub mod swizzle;

pub use crate::arena::{Arena, ArenaStr};
pub use crate::assemble::Assembly;
pub use crate::builder::Shader;
pub use crate::config::ShaderConfig;
pub use crate::error::{AsmError, Location, Result};
pub use crate::ir::{
    Alloc, AllocType, AluInstr, Attribute, CfId, Const, ControlFlow, ExecClause, FetchInstr,
    InstrId, InstrKind, Instruction, RegFlags, Register, Sampler, Signedness, Uniform, Varying,
};
pub use crate::opcodes::{CfType, FetchOpcode, ScalarOpcode, VectorOpcode};
pub use crate::resolve::ResolveWarning;
pub use crate::stats::ShaderInfo;
pub use crate::swizzle::{SwizzleError, SwizzleKind};
