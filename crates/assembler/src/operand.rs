// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! §4.3 instruction-key detection, operand half: turns a raw uppercase token
//! from the parser into a classified [`Operand`]. Both assembler passes call
//! the same [`classify`], which is what guarantees pass 1's offset bookkeeping
//! and pass 2's byte emission never disagree about what an operand means.

use emu8086_isa::{AssembleError, OperandKind, OperandShape, Reg16};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg16(Reg16),
    /// The 8-bit `CL` count register — the only byte-sized register this
    /// instruction subset ever accepts as an operand (shift/rotate by CL).
    Cl,
    Immediate(i64),
    Label(String),
    /// `[expr]` where `expr` is a bare numeral: the only memory-operand shape
    /// the assembler's text syntax accepts (§9 design note). The CPU's
    /// effective-address resolver supports the full addressing-mode grammar
    /// when decoding raw bytes; this is strictly narrower.
    MemoryDirect(i64),
}

impl Operand {
    pub fn shape(&self) -> OperandShape {
        match self {
            Operand::Reg16(_) | Operand::Cl => OperandShape::Register,
            Operand::Immediate(_) => OperandShape::Immediate,
            Operand::Label(_) | Operand::MemoryDirect(_) => OperandShape::Other,
        }
    }

    /// Projects onto the coarser [`OperandKind`] the shared encoding table
    /// uses to decide instruction size. `Cl` maps to an arbitrary register —
    /// safe only because the one encoding family that ever sees a `CL`
    /// operand (`GroupShift`) ignores its operands when computing size.
    pub fn to_isa_kind(&self) -> OperandKind {
        match self {
            Operand::Reg16(r) => OperandKind::Register(*r),
            Operand::Cl => OperandKind::Register(Reg16::CX),
            Operand::Immediate(v) => OperandKind::Immediate(*v),
            Operand::Label(_) | Operand::MemoryDirect(_) => OperandKind::Memory,
        }
    }
}

pub fn classify(token: &str, line_no: usize) -> Result<Operand, AssembleError> {
    let token = token.trim();
    if let Some(inner) = token.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let value = parse_immediate(inner.trim()).ok_or_else(|| AssembleError::InvalidOperand {
            operand: token.to_string(),
            line: line_no,
        })?;
        return Ok(Operand::MemoryDirect(value));
    }
    if token == "CL" {
        return Ok(Operand::Cl);
    }
    if let Some(reg) = Reg16::from_name(token) {
        return Ok(Operand::Reg16(reg));
    }
    if let Some(value) = parse_immediate(token) {
        return Ok(Operand::Immediate(value));
    }
    if is_label_name(token) {
        return Ok(Operand::Label(token.to_string()));
    }
    Err(AssembleError::InvalidOperand { operand: token.to_string(), line: line_no })
}

/// Decimal (optionally signed) or `0x`-prefixed hexadecimal, per §4.3.
fn parse_immediate(token: &str) -> Option<i64> {
    let (sign, rest) = match token.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1, token),
    };
    if rest.is_empty() {
        return None;
    }
    if let Some(hex) = rest.strip_prefix("0X") {
        return i64::from_str_radix(hex, 16).ok().map(|v| sign * v);
    }
    if rest.bytes().all(|b| b.is_ascii_digit()) {
        return rest.parse::<i64>().ok().map(|v| sign * v);
    }
    None
}

fn is_label_name(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_registers_immediates_and_labels() {
        assert_eq!(classify("AX", 1).unwrap(), Operand::Reg16(Reg16::AX));
        assert_eq!(classify("CL", 1).unwrap(), Operand::Cl);
        assert_eq!(classify("5", 1).unwrap(), Operand::Immediate(5));
        assert_eq!(classify("-5", 1).unwrap(), Operand::Immediate(-5));
        assert_eq!(classify("0XFF", 1).unwrap(), Operand::Immediate(255));
        assert_eq!(classify("L1", 1).unwrap(), Operand::Label("L1".to_string()));
        assert_eq!(classify("[0X10]", 1).unwrap(), Operand::MemoryDirect(16));
    }

    #[test]
    fn rejects_unparseable_memory_operand() {
        assert!(classify("[BX]", 1).is_err());
    }

    #[test]
    fn rejects_empty_operand() {
        assert!(classify("", 1).is_err());
    }
}
