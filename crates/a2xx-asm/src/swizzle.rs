//! Component selection and write-mask encodings.
//!
//! Every codec takes the operand's swizzle string (`None` when the operand carries none) over the
//! alphabet `x y z w 0 1 _` and returns the packed field. Component 0 always lands in the lowest
//! bits.

use std::fmt;

use thiserror::Error;

/// Pass-through destination swizzle for fetches (`x`,`y`,`z`,`w` -> 0,1,2,3 at 3 bits each).
pub const FETCH_DST_IDENTITY: u32 = 0x688;

/// All four ALU destination components enabled.
pub const ALU_WRITE_MASK_ALL: u32 = 0xf;

/// Identity ALU source swizzle.
pub const ALU_SRC_IDENTITY: u32 = 0x0;

const COMPONENTS: [u8; 4] = *b"xyzw";

/// Which encoding rejected a swizzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwizzleKind {
    FetchSrc,
    FetchDst,
    AluDst,
    AluSrc,
}

impl fmt::Display for SwizzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchSrc => "fetch source",
            Self::FetchDst => "fetch destination",
            Self::AluDst => "ALU destination",
            Self::AluSrc => "ALU source",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwizzleError {
    #[error("{kind} swizzle is required")]
    Missing { kind: SwizzleKind },

    #[error("{kind} swizzle {swizzle:?} must have {expected} components")]
    BadLength {
        kind: SwizzleKind,
        swizzle: String,
        expected: usize,
    },

    #[error("{kind} swizzle {swizzle:?} has invalid component {component:?} at position {position}")]
    BadComponent {
        kind: SwizzleKind,
        swizzle: String,
        component: char,
        position: usize,
    },
}

fn component_index(c: u8) -> Option<u32> {
    COMPONENTS.iter().position(|&x| x == c).map(|i| i as u32)
}

fn check_len(kind: SwizzleKind, swizzle: &str, expected: usize) -> Result<&[u8], SwizzleError> {
    if swizzle.len() != expected || !swizzle.is_ascii() {
        return Err(SwizzleError::BadLength {
            kind,
            swizzle: swizzle.to_owned(),
            expected,
        });
    }
    Ok(swizzle.as_bytes())
}

fn bad_component(kind: SwizzleKind, swizzle: &str, position: usize) -> SwizzleError {
    SwizzleError::BadComponent {
        kind,
        swizzle: swizzle.to_owned(),
        component: char::from(swizzle.as_bytes()[position]),
        position,
    }
}

/// Encode each component with `per_component`, packing `bits` per component with component 0 in
/// the low bits.
fn pack(
    kind: SwizzleKind,
    swizzle: &str,
    bytes: &[u8],
    bits: u32,
    per_component: impl Fn(usize, u8) -> Option<u32>,
) -> Result<u32, SwizzleError> {
    let mut packed = 0;
    for (position, &c) in bytes.iter().enumerate().rev() {
        let code = per_component(position, c).ok_or_else(|| bad_component(kind, swizzle, position))?;
        packed = (packed << bits) | code;
    }
    Ok(packed)
}

/// Fetch source selection: `n` components (1 for vertex, 3 for texture fetch), 2 bits each.
///
/// Unlike the other codecs there is no default; the swizzle must be present.
pub fn fetch_src_swizzle(swizzle: Option<&str>, n: usize) -> Result<u32, SwizzleError> {
    let kind = SwizzleKind::FetchSrc;
    let swizzle = swizzle.ok_or(SwizzleError::Missing { kind })?;
    let bytes = check_len(kind, swizzle, n)?;
    pack(kind, swizzle, bytes, 2, |_, c| component_index(c))
}

/// Fetch destination swizzle/mask: 3 bits per component, `0`/`1` select constants and `_` masks
/// the component off.
pub fn fetch_dst_swizzle(swizzle: Option<&str>) -> Result<u32, SwizzleError> {
    let kind = SwizzleKind::FetchDst;
    let Some(swizzle) = swizzle else {
        return Ok(FETCH_DST_IDENTITY);
    };
    let bytes = check_len(kind, swizzle, 4)?;
    pack(kind, swizzle, bytes, 3, |_, c| match c {
        b'0' => Some(0x4),
        b'1' => Some(0x5),
        b'_' => Some(0x7),
        c => component_index(c),
    })
}

/// ALU destination write mask: a component is written when its character is the identity
/// component for its position, and skipped on `_`.
pub fn alu_dst_write_mask(swizzle: Option<&str>) -> Result<u32, SwizzleError> {
    let kind = SwizzleKind::AluDst;
    let Some(swizzle) = swizzle else {
        return Ok(ALU_WRITE_MASK_ALL);
    };
    let bytes = check_len(kind, swizzle, 4)?;
    pack(kind, swizzle, bytes, 1, |position, c| match c {
        b'_' => Some(0),
        c if c == COMPONENTS[position] => Some(1),
        _ => None,
    })
}

/// ALU source swizzle: 2 bits per component, stored relative to the lane it is read into, i.e.
/// `(component - position) mod 4`.
pub fn alu_src_swizzle(swizzle: Option<&str>) -> Result<u32, SwizzleError> {
    let kind = SwizzleKind::AluSrc;
    let Some(swizzle) = swizzle else {
        return Ok(ALU_SRC_IDENTITY);
    };
    let bytes = check_len(kind, swizzle, 4)?;
    pack(kind, swizzle, bytes, 2, |position, c| {
        component_index(c).map(|index| index.wrapping_sub(position as u32) & 0x3)
    })
}
