//! Closed opcode enumerations and their hardware encodings.
//!
//! Inside the crate every opcode is an enum, so encoders match exhaustively. Front ends that carry
//! raw numeric opcodes go through `TryFrom<u32>`, which rejects values outside the enumeration.

use crate::error::{AsmError, Result};

macro_rules! opcodes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $kind:literal {
            $($variant:ident = $value:literal => $mnemonic:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Hardware encoding of the opcode.
            pub fn raw(self) -> u32 {
                self as u32
            }

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)*
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = AsmError;

            fn try_from(value: u32) -> Result<Self> {
                match value {
                    $($value => Ok(Self::$variant),)*
                    _ => Err(AsmError::UnknownOpcode { kind: $kind, value }),
                }
            }
        }
    };
}

opcodes! {
    /// Control-flow node type. The raw value is the CF opcode nibble.
    pub enum CfType: "control-flow" {
        Nop = 0x0 => "NOP",
        Exec = 0x1 => "EXEC",
        ExecEnd = 0x2 => "EXEC_END",
        Alloc = 0xc => "ALLOC",
    }
}

impl CfType {
    /// `EXEC` and `EXEC_END` wrap an instruction clause.
    pub fn is_exec(self) -> bool {
        matches!(self, Self::Exec | Self::ExecEnd)
    }
}

opcodes! {
    pub enum FetchOpcode: "fetch" {
        Vertex = 0x00 => "VERTEX",
        Sample = 0x01 => "SAMPLE",
    }
}

opcodes! {
    pub enum VectorOpcode: "vector" {
        Add = 0 => "ADDv",
        Mul = 1 => "MULv",
        Max = 2 => "MAXv",
        Min = 3 => "MINv",
        SetE = 4 => "SETEv",
        SetGt = 5 => "SETGTv",
        SetGte = 6 => "SETGTEv",
        SetNe = 7 => "SETNEv",
        Frac = 8 => "FRACv",
        Trunc = 9 => "TRUNCv",
        Floor = 10 => "FLOORv",
        MulAdd = 11 => "MULADDv",
        CndE = 12 => "CNDEv",
        CndGte = 13 => "CNDGTEv",
        CndGt = 14 => "CNDGTv",
        Dot4 = 15 => "DOT4v",
        Dot3 = 16 => "DOT3v",
        Dot2Add = 17 => "DOT2ADDv",
        Cube = 18 => "CUBEv",
        Max4 = 19 => "MAX4v",
        PredSetEPush = 20 => "PRED_SETE_PUSHv",
        PredSetNePush = 21 => "PRED_SETNE_PUSHv",
        PredSetGtPush = 22 => "PRED_SETGT_PUSHv",
        PredSetGtePush = 23 => "PRED_SETGTE_PUSHv",
        KillE = 24 => "KILLEv",
        KillGt = 25 => "KILLGTv",
        KillGte = 26 => "KILLGTEv",
        KillNe = 27 => "KILLNEv",
        Dst = 28 => "DSTv",
        MovA = 29 => "MOVAv",
    }
}

impl VectorOpcode {
    /// Opcodes that read a third source operand, listed first in the operand list.
    pub fn has_src3(self) -> bool {
        matches!(self, Self::MulAdd)
    }
}

opcodes! {
    pub enum ScalarOpcode: "scalar" {
        Add = 0 => "ADDs",
        AddPrev = 1 => "ADD_PREVs",
        Mul = 2 => "MULs",
        MulPrev = 3 => "MUL_PREVs",
        MulPrev2 = 4 => "MUL_PREV2s",
        Max = 5 => "MAXs",
        Min = 6 => "MINs",
        SetE = 7 => "SETEs",
        SetGt = 8 => "SETGTs",
        SetGte = 9 => "SETGTEs",
        SetNe = 10 => "SETNEs",
        Frac = 11 => "FRACs",
        Trunc = 12 => "TRUNCs",
        Floor = 13 => "FLOORs",
        ExpIeee = 14 => "EXP_IEEE",
        LogClamp = 15 => "LOG_CLAMP",
        LogIeee = 16 => "LOG_IEEE",
        RecipClamp = 17 => "RECIP_CLAMP",
        RecipFf = 18 => "RECIP_FF",
        RecipIeee = 19 => "RECIP_IEEE",
        RecipSqClamp = 20 => "RECIPSQ_CLAMP",
        RecipSqFf = 21 => "RECIPSQ_FF",
        RecipSqIeee = 22 => "RECIPSQ_IEEE",
        MovA = 23 => "MOVAs",
        MovAFloor = 24 => "MOVA_FLOORs",
        Sub = 25 => "SUBs",
        SubPrev = 26 => "SUB_PREVs",
        PredSetE = 27 => "PRED_SETEs",
        PredSetNe = 28 => "PRED_SETNEs",
        PredSetGt = 29 => "PRED_SETGTs",
        PredSetGte = 30 => "PRED_SETGTEs",
        PredSetInv = 31 => "PRED_SET_INVs",
        PredSetPop = 32 => "PRED_SET_POPs",
        PredSetClr = 33 => "PRED_SET_CLRs",
        PredSetRestore = 34 => "PRED_SET_RESTOREs",
        KillE = 35 => "KILLEs",
        KillGt = 36 => "KILLGTs",
        KillGte = 37 => "KILLGTEs",
        KillNe = 38 => "KILLNEs",
        KillOne = 39 => "KILLONEs",
        SqrtIeee = 40 => "SQRT_IEEE",
        MulConst0 = 42 => "MUL_CONST_0",
        MulConst1 = 43 => "MUL_CONST_1",
        AddConst0 = 44 => "ADD_CONST_0",
        AddConst1 = 45 => "ADD_CONST_1",
        SubConst0 = 46 => "SUB_CONST_0",
        SubConst1 = 47 => "SUB_CONST_1",
        Sin = 48 => "SIN",
        Cos = 49 => "COS",
        RetainPrev = 50 => "RETAIN_PREV",
    }
}
