use tracing::debug;

use crate::builder::Shader;
use crate::encode::{encode_cf_pair, encode_instr, RECORD_DWORDS};
use crate::error::{AsmError, Location, Result};
use crate::opcodes::CfType;
use crate::resolve::{resolve, ResolveWarning};
use crate::stats::ShaderInfo;

/// Result of a successful [`Shader::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// Number of dwords written to the output buffer.
    pub dwords: usize,
    pub info: ShaderInfo,
    /// Non-fatal resolver diagnostics.
    pub warnings: Vec<ResolveWarning>,
}

impl Shader {
    /// Exact size of the assembled program in dwords.
    pub fn required_dwords(&self) -> usize {
        RECORD_DWORDS * (self.cfs.len().div_ceil(2) + self.instr_count())
    }

    /// Pad the CF list to an even length and resolve every exec clause.
    ///
    /// [`Shader::assemble`] does this itself; calling it directly is only needed to inspect the
    /// resolved fields.
    pub fn resolve(&mut self) -> Result<Vec<ResolveWarning>> {
        if self.cfs.len() % 2 != 0 {
            self.cf_create(CfType::Nop)?;
        }
        Ok(resolve(&mut self.cfs))
    }

    /// Assemble the shader into `out`.
    ///
    /// The layout is the CF program (one record per CF pair) followed by one record per
    /// instruction in CF order. `out` is only written when assembly succeeds.
    pub fn assemble(&mut self, out: &mut [u32]) -> Result<Assembly> {
        let needed = self.required_dwords();
        if out.len() < needed {
            return Err(AsmError::OutputTooSmall {
                needed,
                capacity: out.len(),
            });
        }

        let mut words = Vec::with_capacity(needed);
        let assembly = self.emit(&mut words)?;
        out[..words.len()].copy_from_slice(&words);
        Ok(assembly)
    }

    /// Assemble into a freshly allocated buffer.
    pub fn assemble_to_vec(&mut self) -> Result<(Vec<u32>, Assembly)> {
        let mut words = Vec::with_capacity(self.required_dwords());
        let assembly = self.emit(&mut words)?;
        Ok((words, assembly))
    }

    fn emit(&mut self, words: &mut Vec<u32>) -> Result<Assembly> {
        let warnings = self.resolve()?;

        for (i, pair) in self.cfs.chunks_exact(2).enumerate() {
            words.extend(encode_cf_pair(&pair[0], &pair[1], 2 * i)?);
        }

        let mut info = ShaderInfo::default();
        let mut idx = 0;
        for (cf, node) in self.cfs.iter().enumerate() {
            let Some(exec) = node.exec() else {
                continue;
            };
            for (index, instr) in exec.instrs().iter().enumerate() {
                let location = Location::Instr { cf, index };
                words.extend(encode_instr(instr, &self.arena, idx, &mut info, location)?);
                idx += 1;
            }
        }

        debug!(
            dwords = words.len(),
            max_reg = info.max_reg,
            max_input_reg = info.max_input_reg,
            warnings = warnings.len(),
            "assembled shader"
        );
        Ok(Assembly {
            dwords: words.len(),
            info,
            warnings,
        })
    }
}
