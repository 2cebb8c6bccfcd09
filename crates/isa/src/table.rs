// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The shared instruction-encoding catalog (§4.6 of the design doc): one
//! declarative entry per mnemonic-form key, consumed by both assembler passes.
//! The CPU's decoder does not walk this table directly (decode dispatches on
//! the raw opcode byte, per §4.7) but imports the same [`crate::opcodes`]
//! constants this table is built from, so the two pipelines cannot drift.

use crate::opcodes::*;

/// A resolved operand, used only to pick the right arm of a size- or
/// opcode-dependent encoding (the AX-shortcut ALU forms, shift-by-1 vs
/// shift-by-CL, and LEA's direct-displacement operand).
#[derive(Debug, Clone, Copy)]
pub enum OperandKind {
    Register(crate::Reg16),
    Immediate(i64),
    Memory,
}

/// The coarse operand shape §4.3 buckets on: whether a token is *any*
/// register (16-bit GPR, segment register, or the 8-bit `CL` count register),
/// an immediate, or neither. Deliberately loses the concrete register width —
/// key derivation only needs "is this a register", never which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    Register,
    Immediate,
    Other,
}

/// Derives the mnemonic-form key described in §4.3: the bucket is decided by
/// operand *shape*, not by which specific mnemonic it is, so the same function
/// serves every instruction.
pub fn instruction_key(mnemonic: &str, operands: &[OperandShape]) -> String {
    use OperandShape::*;
    match operands {
        [Register, Register] => format!("{mnemonic}_REG_REG"),
        [Register, Immediate] => format!("{mnemonic}_REG_IMM"),
        [Register] => format!("{mnemonic}_REG"),
        _ => mnemonic.to_string(),
    }
}

/// One catalog entry: everything the encoder needs to turn a parsed mnemonic
/// and its operands into bytes, and everything pass 1 needs to know how many
/// bytes that will be without emitting them.
#[derive(Debug, Clone, Copy)]
pub enum Encoding {
    /// A single opcode byte, no operands encoded (`NOP`, `HLT`, `RET`, ...).
    Plain { opcode: u8 },
    /// `opcode + regIndex(operand0)` (`PUSH`/`POP`/`INC`/`DEC` reg).
    RegInOpcode { opcode_base: u8 },
    /// `opcode, ModR/M(mod=11, reg=src, rm=dest)` (`MOV`/`ADD`/`XCHG` reg,reg, ...).
    ModrmRegReg { opcode: u8 },
    /// `opcode + regIndex(dest), imm16` (`MOV reg, imm`).
    MovRegImm { opcode_base: u8 },
    /// Either the dedicated `AX, imm16` opcode when the destination is AX, or
    /// the `0x81 /ext` group form otherwise. Both branches emit a trailing
    /// 16-bit immediate; only the presence of a ModR/M byte differs.
    AluRegImm { ax_opcode: u8, group_ext: u8 },
    /// `0xF7 /ext`, optionally followed by a 16-bit immediate (`TEST` only).
    GroupF7 { ext: u8, has_immediate: bool },
    /// `0xD1 /ext` (shift/rotate by the literal count 1) or `0xD3 /ext`
    /// (shift/rotate by CL).
    GroupShift { ext: u8, by_cl: bool },
    /// `opcode, disp8` relative to the end of the instruction.
    RelativeShort { opcode: u8 },
    /// `opcode, disp16` (little-endian) relative to the end of the instruction.
    RelativeNear { opcode: u8 },
    /// `0x8D, ModR/M(mod=00, reg=dest, rm=110), disp16` — direct-displacement
    /// memory operand only (§9 design note: the assembler's LEA text syntax is
    /// narrower than the full effective-address grammar the CPU decodes).
    LeaDirect,
}

impl Encoding {
    /// Total instruction length in bytes for the given (already validated)
    /// operands. Used identically by pass 1 (offset bookkeeping) and pass 2
    /// (byte emission), which is what keeps them from disagreeing.
    pub fn size(&self, operands: &[OperandKind]) -> u8 {
        match self {
            Encoding::Plain { .. } => 1,
            Encoding::RegInOpcode { .. } => 1,
            Encoding::ModrmRegReg { .. } => 2,
            Encoding::MovRegImm { .. } => 3,
            Encoding::AluRegImm { .. } => {
                if matches!(operands.first(), Some(OperandKind::Register(r)) if *r == crate::Reg16::AX)
                {
                    3
                } else {
                    4
                }
            }
            Encoding::GroupF7 { has_immediate, .. } => {
                if *has_immediate {
                    4
                } else {
                    2
                }
            }
            Encoding::GroupShift { .. } => 2,
            Encoding::RelativeShort { .. } => 2,
            Encoding::RelativeNear { .. } => 3,
            Encoding::LeaDirect => 4,
        }
    }
}

/// Looks up the shared descriptor for a mnemonic-form key (e.g. `"ADD_REG_REG"`,
/// built by [`crate::instruction_key`]). `None` means "no such mnemonic form",
/// which callers surface as an assembly error.
pub fn lookup(key: &str) -> Option<Encoding> {
    use Encoding::*;
    Some(match key {
        "MOV_REG_REG" => ModrmRegReg { opcode: MOV_REG_REG },
        "MOV_REG_IMM" => MovRegImm { opcode_base: MOV_REG_IMM_BASE },
        "PUSH_REG" => RegInOpcode { opcode_base: PUSH_REG_BASE },
        "POP_REG" => RegInOpcode { opcode_base: POP_REG_BASE },
        "XCHG_REG_REG" => ModrmRegReg { opcode: XCHG_REG_REG },
        "LEA" => LeaDirect,

        "ADD_REG_REG" => ModrmRegReg { opcode: ADD_REG_REG },
        "SUB_REG_REG" => ModrmRegReg { opcode: SUB_REG_REG },
        "CMP_REG_REG" => ModrmRegReg { opcode: CMP_REG_REG },
        "AND_REG_REG" => ModrmRegReg { opcode: AND_REG_REG },
        "OR_REG_REG" => ModrmRegReg { opcode: OR_REG_REG },
        "XOR_REG_REG" => ModrmRegReg { opcode: XOR_REG_REG },
        "TEST_REG_REG" => ModrmRegReg { opcode: TEST_REG_REG },

        "ADD_REG_IMM" => AluRegImm { ax_opcode: ADD_AX_IMM, group_ext: alu_imm_ext::ADD },
        "SUB_REG_IMM" => AluRegImm { ax_opcode: SUB_AX_IMM, group_ext: alu_imm_ext::SUB },
        "CMP_REG_IMM" => AluRegImm { ax_opcode: CMP_AX_IMM, group_ext: alu_imm_ext::CMP },
        "AND_REG_IMM" => AluRegImm { ax_opcode: AND_AX_IMM, group_ext: alu_imm_ext::AND },
        "OR_REG_IMM" => AluRegImm { ax_opcode: OR_AX_IMM, group_ext: alu_imm_ext::OR },
        "XOR_REG_IMM" => AluRegImm { ax_opcode: XOR_AX_IMM, group_ext: alu_imm_ext::XOR },
        "TEST_REG_IMM" => GroupF7 { ext: f7_ext::TEST, has_immediate: true },

        "MUL_REG" => GroupF7 { ext: f7_ext::MUL, has_immediate: false },
        "IMUL_REG" => GroupF7 { ext: f7_ext::IMUL, has_immediate: false },
        "DIV_REG" => GroupF7 { ext: f7_ext::DIV, has_immediate: false },
        "IDIV_REG" => GroupF7 { ext: f7_ext::IDIV, has_immediate: false },
        "NEG_REG" => GroupF7 { ext: f7_ext::NEG, has_immediate: false },
        "NOT_REG" => GroupF7 { ext: f7_ext::NOT, has_immediate: false },

        "INC_REG" => RegInOpcode { opcode_base: INC_REG_BASE },
        "DEC_REG" => RegInOpcode { opcode_base: DEC_REG_BASE },

        "SHL_REG_IMM" => GroupShift { ext: shift_ext::SHL, by_cl: false },
        "SHR_REG_IMM" => GroupShift { ext: shift_ext::SHR, by_cl: false },
        "SAR_REG_IMM" => GroupShift { ext: shift_ext::SAR, by_cl: false },
        "ROL_REG_IMM" => GroupShift { ext: shift_ext::ROL, by_cl: false },
        "ROR_REG_IMM" => GroupShift { ext: shift_ext::ROR, by_cl: false },
        "RCL_REG_IMM" => GroupShift { ext: shift_ext::RCL, by_cl: false },
        "RCR_REG_IMM" => GroupShift { ext: shift_ext::RCR, by_cl: false },
        "SHL_REG_REG" => GroupShift { ext: shift_ext::SHL, by_cl: true },
        "SHR_REG_REG" => GroupShift { ext: shift_ext::SHR, by_cl: true },
        "SAR_REG_REG" => GroupShift { ext: shift_ext::SAR, by_cl: true },
        "ROL_REG_REG" => GroupShift { ext: shift_ext::ROL, by_cl: true },
        "ROR_REG_REG" => GroupShift { ext: shift_ext::ROR, by_cl: true },
        "RCL_REG_REG" => GroupShift { ext: shift_ext::RCL, by_cl: true },
        "RCR_REG_REG" => GroupShift { ext: shift_ext::RCR, by_cl: true },

        "MOVSB" => Plain { opcode: MOVSB },
        "LODSB" => Plain { opcode: LODSB },
        "STOSB" => Plain { opcode: STOSB },
        "CMPSB" => Plain { opcode: CMPSB },

        "JMP" => RelativeNear { opcode: JMP_NEAR },
        "CALL" => RelativeNear { opcode: CALL_NEAR },
        "RET" => Plain { opcode: RET },

        "JE" | "JZ" => RelativeShort { opcode: JE_JZ },
        "JNE" | "JNZ" => RelativeShort { opcode: JNE_JNZ },
        "JC" => RelativeShort { opcode: JC },
        "JNC" => RelativeShort { opcode: JNC },

        "NOP" => Plain { opcode: NOP },
        "HLT" => Plain { opcode: HLT },
        "CLC" => Plain { opcode: CLC },
        "STC" => Plain { opcode: STC },
        "CMC" => Plain { opcode: CMC },
        "PUSHF" => Plain { opcode: PUSHF },
        "POPF" => Plain { opcode: POPF },
        "CLD" => Plain { opcode: CLD },
        "STD" => Plain { opcode: STD },

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reg16;

    #[test]
    fn mov_reg_imm_is_three_bytes() {
        let enc = lookup("MOV_REG_IMM").unwrap();
        assert_eq!(enc.size(&[OperandKind::Register(Reg16::AX), OperandKind::Immediate(5)]), 3);
    }

    #[test]
    fn add_reg_imm_shrinks_for_ax_destination() {
        let enc = lookup("ADD_REG_IMM").unwrap();
        assert_eq!(enc.size(&[OperandKind::Register(Reg16::AX), OperandKind::Immediate(2)]), 3);
        assert_eq!(enc.size(&[OperandKind::Register(Reg16::CX), OperandKind::Immediate(2)]), 4);
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(lookup("FROB_REG_REG").is_none());
    }

    #[test]
    fn je_and_jz_share_a_descriptor() {
        assert_eq!(
            lookup("JE").map(|e| e.size(&[])),
            lookup("JZ").map(|e| e.size(&[]))
        );
    }

    #[test]
    fn key_shapes() {
        use OperandShape::*;
        assert_eq!(instruction_key("MOV", &[Register, Register]), "MOV_REG_REG");
        assert_eq!(instruction_key("MOV", &[Register, Immediate]), "MOV_REG_IMM");
        assert_eq!(instruction_key("PUSH", &[Register]), "PUSH_REG");
        assert_eq!(instruction_key("HLT", &[]), "HLT");
        assert_eq!(instruction_key("JMP", &[Other]), "JMP");
    }
}
