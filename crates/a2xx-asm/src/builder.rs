use std::mem::size_of;

use tracing::debug;

use crate::arena::{align4, Arena, ArenaStr};
use crate::config::ShaderConfig;
use crate::error::{AsmError, Result};
use crate::ir::{
    Alloc, AllocType, Attribute, CfId, Const, ControlFlow, InstrId, InstrKind, Instruction,
    RegFlags, Register, Sampler, Uniform, Varying,
};
use crate::limits::{
    MAX_ATTRIBUTES, MAX_CF, MAX_CONSTS, MAX_INSTRS_PER_EXEC, MAX_REGISTER, MAX_REGS_PER_INSTR,
    MAX_SAMPLERS, MAX_UNIFORMS, MAX_VARYINGS,
};
use crate::opcodes::CfType;

fn check_capacity(len: usize, limit: usize, what: &'static str) -> Result<()> {
    if len >= limit {
        return Err(AsmError::CapacityExceeded { what, limit });
    }
    Ok(())
}

/// A shader program under construction.
///
/// Entities are append-only: the builder methods hand out handles that stay valid for the
/// lifetime of the shader, and nothing is ever removed. Everything (including operand swizzles
/// and metadata names) is accounted against a single arena sized by [`ShaderConfig::heap_size`].
#[derive(Debug, Clone)]
pub struct Shader {
    pub(crate) arena: Arena,
    pub(crate) cfs: Vec<ControlFlow>,
    attributes: Vec<Attribute>,
    uniforms: Vec<Uniform>,
    samplers: Vec<Sampler>,
    consts: Vec<Const>,
    varyings: Vec<Varying>,
}

impl Default for Shader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader {
    pub fn new() -> Self {
        Self::with_config(ShaderConfig::default())
    }

    pub fn with_config(config: ShaderConfig) -> Self {
        debug!(heap_size = config.heap_size, "creating shader");
        Self {
            arena: Arena::new(config.heap_size),
            cfs: Vec::new(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            samplers: Vec::new(),
            consts: Vec::new(),
            varyings: Vec::new(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn str(&self, s: ArenaStr) -> Result<&str> {
        self.arena.str(s).ok_or(AsmError::InvalidHandle)
    }

    /// Name of a metadata record, if it has one. Names from another shader resolve to `None`.
    pub fn name(&self, name: Option<ArenaStr>) -> Option<&str> {
        name.and_then(|s| self.arena.str(s))
    }

    pub fn swizzle(&self, reg: &Register) -> Option<&str> {
        self.name(reg.swizzle)
    }

    fn charge<T>(&mut self) -> Result<()> {
        self.arena.allocate(size_of::<T>()).map(|_| ())
    }

    /// Charge a `T` together with a copy of `s`. Nothing is consumed unless both fit.
    fn charge_with_string<T>(&mut self, s: Option<&str>) -> Result<Option<ArenaStr>> {
        let string_size = s.map_or(0, |s| align4(s.len()));
        let requested = align4(size_of::<T>()) + string_size;
        if requested > self.arena.remaining() {
            return Err(AsmError::ArenaExhausted {
                requested,
                remaining: self.arena.remaining(),
            });
        }
        self.charge::<T>()?;
        self.arena.duplicate_string(s)
    }

    pub fn cfs(&self) -> &[ControlFlow] {
        &self.cfs
    }

    pub fn cf(&self, id: CfId) -> Result<&ControlFlow> {
        self.cfs.get(id.0).ok_or(AsmError::InvalidHandle)
    }

    pub fn cf_mut(&mut self, id: CfId) -> Result<&mut ControlFlow> {
        self.cfs.get_mut(id.0).ok_or(AsmError::InvalidHandle)
    }

    pub fn instr(&self, id: InstrId) -> Result<&Instruction> {
        self.cf(id.cf())?
            .exec()
            .ok_or(AsmError::NotExecClause { cf: id.cf })?
            .instrs
            .get(id.index)
            .ok_or(AsmError::InvalidHandle)
    }

    pub fn instr_mut(&mut self, id: InstrId) -> Result<&mut Instruction> {
        self.cf_mut(id.cf())?
            .exec_mut()
            .ok_or(AsmError::NotExecClause { cf: id.cf })?
            .instrs
            .get_mut(id.index)
            .ok_or(AsmError::InvalidHandle)
    }

    /// Total number of instructions across all exec clauses.
    pub fn instr_count(&self) -> usize {
        self.cfs
            .iter()
            .filter_map(ControlFlow::exec)
            .map(|exec| exec.instrs.len())
            .sum()
    }

    /// Append a control-flow node of the given type.
    pub fn cf_create(&mut self, cf_type: CfType) -> Result<CfId> {
        check_capacity(self.cfs.len(), MAX_CF, "control-flow nodes")?;
        self.charge::<ControlFlow>()?;
        debug!(cf = self.cfs.len(), cf_type = cf_type.mnemonic(), "cf_create");
        self.cfs.push(ControlFlow::new(cf_type));
        Ok(CfId(self.cfs.len() - 1))
    }

    /// Append an `ALLOC` node.
    pub fn alloc_create(&mut self, ty: AllocType, size: u32) -> Result<CfId> {
        let id = self.cf_create(CfType::Alloc)?;
        if let Some(alloc) = self.cf_mut(id)?.alloc_mut() {
            *alloc = Alloc { size, ty };
        }
        Ok(id)
    }

    /// Append an instruction to an `EXEC`/`EXEC_END` clause.
    pub fn instr_create(&mut self, cf: CfId, kind: impl Into<InstrKind>) -> Result<InstrId> {
        let kind = kind.into();
        let len = self
            .cf(cf)?
            .exec()
            .ok_or(AsmError::NotExecClause { cf: cf.0 })?
            .instrs
            .len();
        check_capacity(len, MAX_INSTRS_PER_EXEC, "instructions in exec clause")?;
        self.charge::<Instruction>()?;
        debug!(cf = cf.0, instr = len, ?kind, "instr_create");

        let exec = self
            .cf_mut(cf)?
            .exec_mut()
            .ok_or(AsmError::NotExecClause { cf: cf.0 })?;
        exec.instrs.push(Instruction::new(kind));
        Ok(InstrId {
            cf: cf.0,
            index: len,
        })
    }

    /// Append a register operand to an instruction and return its operand index.
    ///
    /// An empty swizzle is treated as absent.
    pub fn reg_create(
        &mut self,
        instr: InstrId,
        num: u32,
        swizzle: Option<&str>,
        flags: RegFlags,
    ) -> Result<usize> {
        if num > MAX_REGISTER {
            return Err(AsmError::RegisterOutOfRange {
                num,
                max: MAX_REGISTER,
            });
        }
        let index = self.instr(instr)?.regs.len();
        check_capacity(index, MAX_REGS_PER_INSTR, "operands in instruction")?;
        let swizzle = self.charge_with_string::<Register>(swizzle)?;
        debug!(num, ?swizzle, ?flags, "reg_create");

        self.instr_mut(instr)?.regs.push(Register {
            num,
            swizzle,
            flags,
        });
        Ok(index)
    }

    /// Record a vertex attribute. Returns its index into [`Shader::attributes`].
    pub fn attribute_create(&mut self, rstart: u32, num: u32, name: Option<&str>) -> Result<usize> {
        check_capacity(self.attributes.len(), MAX_ATTRIBUTES, "attributes")?;
        let name = self.charge_with_string::<Attribute>(name)?;
        debug!(rstart, num, ?name, "attribute_create");
        self.attributes.push(Attribute { name, rstart, num });
        Ok(self.attributes.len() - 1)
    }

    pub fn uniform_create(&mut self, cstart: u32, num: u32, name: Option<&str>) -> Result<usize> {
        check_capacity(self.uniforms.len(), MAX_UNIFORMS, "uniforms")?;
        let name = self.charge_with_string::<Uniform>(name)?;
        debug!(cstart, num, ?name, "uniform_create");
        self.uniforms.push(Uniform { name, cstart, num });
        Ok(self.uniforms.len() - 1)
    }

    pub fn sampler_create(&mut self, idx: u32, name: Option<&str>) -> Result<usize> {
        check_capacity(self.samplers.len(), MAX_SAMPLERS, "samplers")?;
        let name = self.charge_with_string::<Sampler>(name)?;
        debug!(idx, ?name, "sampler_create");
        self.samplers.push(Sampler { name, idx });
        Ok(self.samplers.len() - 1)
    }

    pub fn const_create(&mut self, cstart: u32, val: [f32; 4]) -> Result<usize> {
        check_capacity(self.consts.len(), MAX_CONSTS, "constants")?;
        self.charge::<Const>()?;
        debug!(cstart, ?val, "const_create");
        self.consts.push(Const { cstart, val });
        Ok(self.consts.len() - 1)
    }

    pub fn varying_create(&mut self, rstart: u32, num: u32, name: Option<&str>) -> Result<usize> {
        check_capacity(self.varyings.len(), MAX_VARYINGS, "varyings")?;
        let name = self.charge_with_string::<Varying>(name)?;
        debug!(rstart, num, ?name, "varying_create");
        self.varyings.push(Varying { name, rstart, num });
        Ok(self.varyings.len() - 1)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    pub fn consts(&self) -> &[Const] {
        &self.consts
    }

    pub fn varyings(&self) -> &[Varying] {
        &self.varyings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AluInstr, FetchInstr};
    use crate::opcodes::VectorOpcode;

    #[test]
    fn cf_capacity_is_enforced() {
        let mut shader = Shader::new();
        for _ in 0..MAX_CF {
            shader.cf_create(CfType::Nop).unwrap();
        }
        assert_eq!(
            shader.cf_create(CfType::Exec),
            Err(AsmError::CapacityExceeded {
                what: "control-flow nodes",
                limit: MAX_CF
            })
        );
        assert_eq!(shader.cfs().len(), MAX_CF);
    }

    #[test]
    fn instructions_only_go_into_exec_clauses() {
        let mut shader = Shader::new();
        let alloc = shader.alloc_create(AllocType::Coord, 0).unwrap();
        assert_eq!(
            shader.instr_create(alloc, AluInstr::new(VectorOpcode::Add)),
            Err(AsmError::NotExecClause { cf: 0 })
        );
    }

    #[test]
    fn clause_and_operand_capacity() {
        let mut shader = Shader::new();
        let exec = shader.cf_create(CfType::Exec).unwrap();
        let mut last = None;
        for _ in 0..MAX_INSTRS_PER_EXEC {
            last = Some(shader.instr_create(exec, FetchInstr::sample(0)).unwrap());
        }
        assert!(matches!(
            shader.instr_create(exec, FetchInstr::sample(0)),
            Err(AsmError::CapacityExceeded { limit: MAX_INSTRS_PER_EXEC, .. })
        ));

        let instr = last.unwrap();
        for n in 0..MAX_REGS_PER_INSTR as u32 {
            shader.reg_create(instr, n, None, RegFlags::empty()).unwrap();
        }
        assert!(matches!(
            shader.reg_create(instr, 0, None, RegFlags::empty()),
            Err(AsmError::CapacityExceeded { limit: MAX_REGS_PER_INSTR, .. })
        ));
    }

    #[test]
    fn register_index_is_bounded() {
        let mut shader = Shader::new();
        let exec = shader.cf_create(CfType::Exec).unwrap();
        let instr = shader.instr_create(exec, FetchInstr::sample(0)).unwrap();
        assert_eq!(
            shader.reg_create(instr, 64, None, RegFlags::empty()),
            Err(AsmError::RegisterOutOfRange { num: 64, max: 63 })
        );
        shader.reg_create(instr, 63, Some("xyzw"), RegFlags::empty()).unwrap();
        let reg = shader.instr(instr).unwrap().regs()[0];
        assert_eq!(shader.swizzle(&reg), Some("xyzw"));
    }

    #[test]
    fn metadata_records_keep_their_names() {
        let mut shader = Shader::new();
        shader.attribute_create(1, 2, Some("aPosition")).unwrap();
        shader.uniform_create(0, 4, Some("uMVP")).unwrap();
        shader.sampler_create(0, Some("uTex")).unwrap();
        shader.const_create(4, [0.0, 0.5, 1.0, 2.0]).unwrap();
        shader.varying_create(0, 1, None).unwrap();

        assert_eq!(shader.name(shader.attributes()[0].name), Some("aPosition"));
        assert_eq!(shader.name(shader.uniforms()[0].name), Some("uMVP"));
        assert_eq!(shader.name(shader.samplers()[0].name), Some("uTex"));
        assert_eq!(shader.consts()[0].val[1], 0.5);
        assert_eq!(shader.name(shader.varyings()[0].name), None);
    }

    #[test]
    fn small_heap_reports_exhaustion() {
        let mut shader = Shader::with_config(ShaderConfig { heap_size: 16 });
        let err = (0..MAX_SAMPLERS)
            .map(|i| shader.sampler_create(i as u32, Some("a_long_sampler_name")))
            .find_map(Result::err);
        assert!(matches!(err, Some(AsmError::ArenaExhausted { .. })));
    }

    #[test]
    fn metadata_capacity_is_enforced() {
        fn fill(
            limit: usize,
            what: &'static str,
            mut create: impl FnMut(&mut Shader, u32) -> Result<usize>,
        ) {
            let mut shader = Shader::new();
            for i in 0..limit {
                assert_eq!(create(&mut shader, i as u32), Ok(i));
            }
            assert_eq!(
                create(&mut shader, limit as u32),
                Err(AsmError::CapacityExceeded { what, limit })
            );
        }

        fill(MAX_ATTRIBUTES, "attributes", |s, i| {
            s.attribute_create(i, 1, Some("aAttr"))
        });
        fill(MAX_UNIFORMS, "uniforms", |s, i| s.uniform_create(i, 1, None));
        fill(MAX_SAMPLERS, "samplers", |s, i| {
            s.sampler_create(i, Some("uTex"))
        });
        fill(MAX_CONSTS, "constants", |s, i| {
            s.const_create(i, [0.0; 4])
        });
        fill(MAX_VARYINGS, "varyings", |s, i| {
            s.varying_create(i, 1, Some("vColor"))
        });
    }

    #[test]
    fn names_from_another_shader_do_not_resolve() {
        let mut ours = Shader::new();
        let mut theirs = Shader::new();
        ours.attribute_create(0, 1, Some("aPosition")).unwrap();
        let index = theirs.attribute_create(0, 1, Some("aNormal")).unwrap();
        let foreign = theirs.attributes()[index].name;

        assert_eq!(theirs.name(foreign), Some("aNormal"));
        assert_eq!(ours.name(foreign), None);
        assert_eq!(ours.str(foreign.unwrap()), Err(AsmError::InvalidHandle));
    }

    #[test]
    fn failed_operand_consumes_no_heap() {
        let heap_size = align4(size_of::<ControlFlow>())
            + align4(size_of::<Instruction>())
            + align4(size_of::<Register>())
            + 4;
        let mut shader = Shader::with_config(ShaderConfig { heap_size });
        let exec = shader.cf_create(CfType::Exec).unwrap();
        let instr = shader.instr_create(exec, FetchInstr::sample(0)).unwrap();

        let used = shader.arena().used();
        assert!(matches!(
            shader.reg_create(instr, 1, Some("xyzw0000"), RegFlags::empty()),
            Err(AsmError::ArenaExhausted { .. })
        ));
        assert_eq!(shader.arena().used(), used);
        assert!(shader.instr(instr).unwrap().regs().is_empty());

        assert_eq!(
            shader.reg_create(instr, 1, Some("xyzw"), RegFlags::empty()),
            Ok(0)
        );
        assert_eq!(shader.arena().remaining(), 0);
    }
}
