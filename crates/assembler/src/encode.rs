// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! §4.5 Pass 2: walks the parsed program a second time, now with every label's
//! offset known, and emits the actual machine code byte by byte.

use crate::operand::{classify, Operand};
use crate::parser::ParsedLine;
use crate::symtab::SymbolTable;
use emu8086_isa::{instruction_key, registers::Reg16, table, table::Encoding, AssembleError};

fn modrm(mode: u8, reg: u8, rm: u8) -> u8 {
    (mode << 6) | (reg << 3) | rm
}

fn require_reg16(op: &Operand, line_no: usize) -> Result<Reg16, AssembleError> {
    match op {
        Operand::Reg16(r) => Ok(*r),
        other => Err(AssembleError::InvalidOperand { operand: format!("{other:?}"), line: line_no }),
    }
}

fn require_immediate(op: &Operand, line_no: usize) -> Result<i64, AssembleError> {
    match op {
        Operand::Immediate(v) => Ok(*v),
        other => Err(AssembleError::InvalidOperand { operand: format!("{other:?}"), line: line_no }),
    }
}

fn require_memory(op: &Operand, line_no: usize) -> Result<i64, AssembleError> {
    match op {
        Operand::MemoryDirect(v) => Ok(*v),
        other => Err(AssembleError::InvalidOperand { operand: format!("{other:?}"), line: line_no }),
    }
}

fn resolve_label(symtab: &SymbolTable, label: &str, line_no: usize) -> Result<u32, AssembleError> {
    symtab
        .labels
        .get(label)
        .copied()
        .ok_or_else(|| AssembleError::UndefinedLabel { label: label.to_string(), line: line_no })
}

fn push_imm16(out: &mut Vec<u8>, value: i64) {
    let word = value as i16 as u16;
    out.extend_from_slice(&word.to_le_bytes());
}

fn encode_one(
    line: &ParsedLine,
    symtab: &SymbolTable,
    offset: u32,
    out: &mut Vec<u8>,
) -> Result<(), AssembleError> {
    let line_no = line.line_no;
    let mnemonic = line.mnemonic.as_ref().expect("encode_one called on a label-only line");
    let operands = line
        .operands
        .iter()
        .map(|token| classify(token, line_no))
        .collect::<Result<Vec<_>, _>>()?;
    let shapes: Vec<_> = operands.iter().map(|op| op.shape()).collect();
    let key = instruction_key(mnemonic, &shapes);
    let encoding = table::lookup(&key)
        .ok_or_else(|| AssembleError::UnknownMnemonicForm { key, line: line_no })?;
    let kinds: Vec<_> = operands.iter().map(|op| op.to_isa_kind()).collect();
    let size = encoding.size(&kinds) as u32;
    let next_offset = offset + size;

    match encoding {
        Encoding::Plain { opcode } => out.push(opcode),

        Encoding::RegInOpcode { opcode_base } => {
            let reg = require_reg16(&operands[0], line_no)?;
            out.push(opcode_base + reg.index());
        }

        Encoding::ModrmRegReg { opcode } => {
            let dest = require_reg16(&operands[0], line_no)?;
            let src = require_reg16(&operands[1], line_no)?;
            out.push(opcode);
            out.push(modrm(0b11, src.index(), dest.index()));
        }

        Encoding::MovRegImm { opcode_base } => {
            let dest = require_reg16(&operands[0], line_no)?;
            let value = require_immediate(&operands[1], line_no)?;
            out.push(opcode_base + dest.index());
            push_imm16(out, value);
        }

        Encoding::AluRegImm { ax_opcode, group_ext } => {
            let dest = require_reg16(&operands[0], line_no)?;
            let value = require_immediate(&operands[1], line_no)?;
            if dest == Reg16::AX {
                out.push(ax_opcode);
            } else {
                out.push(emu8086_isa::opcodes::GROUP_ALU_IMM);
                out.push(modrm(0b11, group_ext, dest.index()));
            }
            push_imm16(out, value);
        }

        Encoding::GroupF7 { ext, has_immediate } => {
            let reg = require_reg16(&operands[0], line_no)?;
            out.push(emu8086_isa::opcodes::GROUP_F7);
            out.push(modrm(0b11, ext, reg.index()));
            if has_immediate {
                let value = require_immediate(&operands[1], line_no)?;
                push_imm16(out, value);
            }
        }

        Encoding::GroupShift { ext, by_cl } => {
            let dest = require_reg16(&operands[0], line_no)?;
            if by_cl {
                if !matches!(operands[1], Operand::Cl) {
                    return Err(AssembleError::InvalidShiftCount { mnemonic: mnemonic.clone(), line: line_no });
                }
                out.push(emu8086_isa::opcodes::GROUP_SHIFT_BY_CL);
            } else {
                if require_immediate(&operands[1], line_no)? != 1 {
                    return Err(AssembleError::InvalidShiftCount { mnemonic: mnemonic.clone(), line: line_no });
                }
                out.push(emu8086_isa::opcodes::GROUP_SHIFT_BY_ONE);
            }
            out.push(modrm(0b11, ext, dest.index()));
        }

        Encoding::RelativeShort { opcode } => {
            let label = match &operands[0] {
                Operand::Label(name) => name.clone(),
                other => {
                    return Err(AssembleError::InvalidOperand { operand: format!("{other:?}"), line: line_no })
                }
            };
            let target = resolve_label(symtab, &label, line_no)?;
            let disp = target as i64 - next_offset as i64;
            if !(i8::MIN as i64..=i8::MAX as i64).contains(&disp) {
                return Err(AssembleError::JumpTooFar { label, line: line_no });
            }
            out.push(opcode);
            out.push(disp as i8 as u8);
        }

        Encoding::RelativeNear { opcode } => {
            let label = match &operands[0] {
                Operand::Label(name) => name.clone(),
                other => {
                    return Err(AssembleError::InvalidOperand { operand: format!("{other:?}"), line: line_no })
                }
            };
            let target = resolve_label(symtab, &label, line_no)?;
            let disp = target as i64 - next_offset as i64;
            if !(i16::MIN as i64..=i16::MAX as i64).contains(&disp) {
                return Err(AssembleError::JumpTooFar { label, line: line_no });
            }
            out.push(opcode);
            out.extend_from_slice(&(disp as i16).to_le_bytes());
        }

        Encoding::LeaDirect => {
            let dest = require_reg16(&operands[0], line_no)?;
            let addr = require_memory(&operands[1], line_no)?;
            out.push(emu8086_isa::opcodes::LEA);
            out.push(modrm(0b00, dest.index(), 0b110));
            out.extend_from_slice(&(addr as u16).to_le_bytes());
        }
    }

    Ok(())
}

pub fn encode(lines: &[ParsedLine], symtab: &SymbolTable) -> Result<Vec<u8>, AssembleError> {
    let mut out = Vec::new();
    let mut offset: u32 = 0;
    for line in lines {
        if line.mnemonic.is_some() {
            encode_one(line, symtab, offset, &mut out)?;
            offset = out.len() as u32;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;
    use crate::symtab;

    fn assemble_bytes(source: &str) -> Vec<u8> {
        let lines = parse(&lex(source)).unwrap();
        let symtab = symtab::build(&lines).unwrap();
        encode(&lines, &symtab).unwrap()
    }

    #[test]
    fn mov_ax_imm_then_hlt() {
        let bytes = assemble_bytes("MOV AX, 5\nHLT");
        assert_eq!(bytes, vec![0xB8, 0x05, 0x00, 0xF4]);
    }

    #[test]
    fn add_ax_imm_uses_short_form() {
        let bytes = assemble_bytes("ADD AX, 2");
        assert_eq!(bytes, vec![0x05, 0x02, 0x00]);
    }

    #[test]
    fn add_cx_imm_uses_group_form() {
        let bytes = assemble_bytes("ADD CX, 2");
        assert_eq!(bytes, vec![0x81, modrm(0b11, 0, 1), 0x02, 0x00]);
    }

    #[test]
    fn backward_jump_computes_negative_displacement() {
        let bytes = assemble_bytes("LOOP_TOP:\nDEC AX\nJNZ LOOP_TOP");
        assert_eq!(bytes[2], 0x75);
        assert_eq!(bytes[3] as i8, -3);
    }

    #[test]
    fn shift_by_literal_one_is_accepted() {
        let bytes = assemble_bytes("SHL AX, 1");
        assert_eq!(bytes, vec![0xD1, modrm(0b11, 4, 0)]);
    }

    #[test]
    fn shift_by_cl_is_accepted() {
        let bytes = assemble_bytes("SHL AX, CL");
        assert_eq!(bytes, vec![0xD3, modrm(0b11, 4, 0)]);
    }

    #[test]
    fn shift_by_other_immediate_is_rejected() {
        let lines = parse(&lex("SHL AX, 3")).unwrap();
        let symtab = symtab::build(&lines).unwrap();
        assert!(matches!(encode(&lines, &symtab), Err(AssembleError::InvalidShiftCount { .. })));
    }

    #[test]
    fn jump_too_far_is_reported_with_source_wording() {
        let mut source = String::from("FAR:\n");
        for _ in 0..200 {
            source.push_str("NOP\n");
        }
        source.push_str("JNZ FAR");
        let lines = parse(&lex(&source)).unwrap();
        let symtab = symtab::build(&lines).unwrap();
        let err = encode(&lines, &symtab).unwrap_err();
        assert_eq!(err.to_string(), "Jump to FAR is too far");
    }
}
