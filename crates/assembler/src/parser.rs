// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! §4.2 Parser: turns each [`LexedLine`] into a [`ParsedLine`] — an optional
//! label, an optional mnemonic, and its raw (still unclassified) operand
//! tokens. Operand classification is [`crate::operand::classify`]'s job, run
//! identically by both assembler passes.

use crate::lexer::LexedLine;
use emu8086_isa::AssembleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line_no: usize,
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operands: Vec<String>,
}

/// A line is `[LABEL:] [MNEMONIC [operand [, operand ...]]]`. Either half may
/// be absent but not both (the lexer has already dropped lines with nothing
/// on them at all).
pub fn parse_line(line: &LexedLine) -> Result<ParsedLine, AssembleError> {
    let mut rest = line.text.as_str();

    let label = if let Some(colon) = rest.find(':') {
        let (before, after) = rest.split_at(colon);
        let name = before.trim();
        if name.is_empty() {
            return Err(AssembleError::UnterminatedLabel { line: line.line_no });
        }
        rest = after[1..].trim_start();
        Some(name.to_string())
    } else {
        None
    };

    if rest.is_empty() {
        return Ok(ParsedLine { line_no: line.line_no, label, mnemonic: None, operands: Vec::new() });
    }

    let mut parts = rest.splitn(2, char::is_whitespace);
    let mnemonic = parts.next().unwrap_or("").to_string();
    let operand_text = parts.next().unwrap_or("").trim();

    let operands = if operand_text.is_empty() {
        Vec::new()
    } else {
        operand_text.split(',').map(|s| s.trim().to_string()).collect()
    };

    if mnemonic.is_empty() {
        return Err(AssembleError::MalformedLine { line: line.line_no, text: line.text.clone() });
    }

    Ok(ParsedLine { line_no: line.line_no, label, mnemonic: Some(mnemonic), operands })
}

pub fn parse(lines: &[LexedLine]) -> Result<Vec<ParsedLine>, AssembleError> {
    lines.iter().map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexed(line_no: usize, text: &str) -> LexedLine {
        LexedLine { line_no, text: text.to_string() }
    }

    #[test]
    fn label_and_mnemonic_and_operands() {
        let parsed = parse_line(&lexed(1, "LOOP_TOP: ADD AX, 1")).unwrap();
        assert_eq!(parsed.label.as_deref(), Some("LOOP_TOP"));
        assert_eq!(parsed.mnemonic.as_deref(), Some("ADD"));
        assert_eq!(parsed.operands, vec!["AX".to_string(), "1".to_string()]);
    }

    #[test]
    fn label_only_line() {
        let parsed = parse_line(&lexed(1, "DONE:")).unwrap();
        assert_eq!(parsed.label.as_deref(), Some("DONE"));
        assert_eq!(parsed.mnemonic, None);
        assert!(parsed.operands.is_empty());
    }

    #[test]
    fn mnemonic_only_line() {
        let parsed = parse_line(&lexed(1, "HLT")).unwrap();
        assert_eq!(parsed.label, None);
        assert_eq!(parsed.mnemonic.as_deref(), Some("HLT"));
        assert!(parsed.operands.is_empty());
    }

    #[test]
    fn mnemonic_with_two_operands() {
        let parsed = parse_line(&lexed(1, "MOV AX, 10")).unwrap();
        assert_eq!(parsed.mnemonic.as_deref(), Some("MOV"));
        assert_eq!(parsed.operands, vec!["AX".to_string(), "10".to_string()]);
    }

    #[test]
    fn unterminated_label_is_rejected() {
        assert!(parse_line(&lexed(1, ": HLT")).is_err());
    }
}
