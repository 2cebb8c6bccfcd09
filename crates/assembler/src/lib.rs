// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Two-pass assembler: lexer → parser → symbol table (pass 1) → encoder
//! (pass 2). [`assemble`] is the one entry point; everything else in this
//! crate exists to support it.

pub mod encode;
pub mod lexer;
pub mod operand;
pub mod parser;
pub mod symtab;

use emu8086_isa::AssembleError;
use std::collections::HashMap;

/// The result of a successful assembly: the machine code, the label→offset
/// map a debugger or disassembler could use, and a hex dump for quick
/// inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledProgram {
    pub machine_code: Vec<u8>,
    pub symbol_table: HashMap<String, i64>,
    pub hex_string: String,
}

/// Assembles 8086 assembly source into machine code. Fails on the first
/// error encountered; there is no partial output on failure (§7).
pub fn assemble(source: &str) -> Result<AssembledProgram, AssembleError> {
    let lexed = lexer::lex(source);
    let parsed = parser::parse(&lexed)?;
    let symtab = symtab::build(&parsed)?;
    let machine_code = encode::encode(&parsed, &symtab)?;

    for (label, offset) in &symtab.labels {
        tracing::debug!(label = %label, offset, "resolved label");
    }

    let symbol_table = symtab.labels.iter().map(|(k, v)| (k.clone(), *v as i64)).collect();
    let hex_string = machine_code.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ");

    tracing::info!(bytes = machine_code.len(), "assembly finished");

    Ok(AssembledProgram { machine_code, symbol_table, hex_string })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mov_add_hlt_scenario() {
        let program = assemble("MOV AX, 5\nADD AX, 3\nHLT").unwrap();
        assert_eq!(program.machine_code, vec![0xB8, 0x05, 0x00, 0x05, 0x03, 0x00, 0xF4]);
        assert_eq!(program.hex_string, "B8 05 00 05 03 00 F4");
    }

    #[test]
    fn mov_dec_jnz_loop_scenario() {
        let program = assemble("MOV CX, 3\nLOOP_TOP:\nDEC CX\nJNZ LOOP_TOP\nHLT").unwrap();
        assert_eq!(program.symbol_table.get("LOOP_TOP"), Some(&3i64));
        assert_eq!(program.machine_code[3], 0x49);
        assert_eq!(program.machine_code[4], 0x75);
        assert_eq!(program.machine_code[5] as i8, -3);
    }

    #[test]
    fn push_pop_round_trip_scenario() {
        let program = assemble("PUSH AX\nPOP BX\nHLT").unwrap();
        assert_eq!(program.machine_code, vec![0x50, 0x5B, 0xF4]);
    }

    #[test]
    fn jump_too_far_surfaces_the_exact_source_message() {
        let mut source = String::from("FAR:\n");
        for _ in 0..200 {
            source.push_str("NOP\n");
        }
        source.push_str("JNZ FAR");
        let err = assemble(&source).unwrap_err();
        assert_eq!(err.to_string(), "Jump to FAR is too far");
    }

    #[test]
    fn undefined_label_is_reported() {
        let err = assemble("JMP NOWHERE").unwrap_err();
        assert!(matches!(err, AssembleError::UndefinedLabel { .. }));
    }

    #[test]
    fn empty_source_assembles_to_nothing() {
        let program = assemble("\n; just comments\n").unwrap();
        assert!(program.machine_code.is_empty());
    }
}
