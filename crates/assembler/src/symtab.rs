// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! §4.4 Pass 1: walks the parsed program once to learn where every label
//! lands. No bytes are emitted here — only [`Encoding::size`] is consulted,
//! which is why pass 1 and pass 2 can never disagree about an offset.

use crate::operand::classify;
use crate::parser::ParsedLine;
use emu8086_isa::{instruction_key, table, AssembleError};
use std::collections::BTreeMap;

pub struct SymbolTable {
    pub labels: BTreeMap<String, u32>,
}

/// Computes an instruction's byte length the same way pass 2 will, without
/// emitting anything.
fn instruction_size(line: &ParsedLine) -> Result<u8, AssembleError> {
    let mnemonic = line.mnemonic.as_ref().expect("instruction_size called on a label-only line");
    let operands = line
        .operands
        .iter()
        .map(|token| classify(token, line.line_no))
        .collect::<Result<Vec<_>, _>>()?;
    let shapes: Vec<_> = operands.iter().map(|op| op.shape()).collect();
    let key = instruction_key(mnemonic, &shapes);
    let encoding = table::lookup(&key)
        .ok_or_else(|| AssembleError::UnknownMnemonicForm { key, line: line.line_no })?;
    let kinds: Vec<_> = operands.iter().map(|op| op.to_isa_kind()).collect();
    Ok(encoding.size(&kinds))
}

pub fn build(lines: &[ParsedLine]) -> Result<SymbolTable, AssembleError> {
    let mut labels = BTreeMap::new();
    let mut offset: u32 = 0;

    for line in lines {
        if let Some(label) = &line.label {
            if labels.insert(label.clone(), offset).is_some() {
                return Err(AssembleError::DuplicateLabel { label: label.clone(), line: line.line_no });
            }
        }
        if line.mnemonic.is_some() {
            offset += instruction_size(line)? as u32;
        }
    }

    Ok(SymbolTable { labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn build_for(source: &str) -> SymbolTable {
        let lines = parse(&lex(source)).unwrap();
        build(&lines).unwrap()
    }

    #[test]
    fn records_label_offsets_across_varying_instruction_sizes() {
        let table = build_for("MOV AX, 5\nLOOP_TOP:\nDEC AX\nJNZ LOOP_TOP\nHLT");
        assert_eq!(table.labels.get("LOOP_TOP"), Some(&3));
    }

    #[test]
    fn detects_duplicate_labels() {
        let lines = parse(&lex("A:\nNOP\nA:\nNOP")).unwrap();
        assert!(matches!(build(&lines), Err(AssembleError::DuplicateLabel { .. })));
    }

    #[test]
    fn rejects_unknown_mnemonic_forms() {
        let lines = parse(&lex("ADD AX, BX, CX")).unwrap();
        assert!(matches!(build(&lines), Err(AssembleError::UnknownMnemonicForm { .. })));
    }
}
