// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use thiserror::Error;

/// Everything that can fail while turning source text into machine code.
/// `assemble()` fails the whole call on the first of these (§7): there is no
/// partial machine-code output.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AssembleError {
    #[error("line {line}: malformed instruction {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: unterminated label")]
    UnterminatedLabel { line: usize },

    #[error("line {line}: duplicate label {label:?}")]
    DuplicateLabel { label: String, line: usize },

    #[error("line {line}: unknown instruction form {key:?}")]
    UnknownMnemonicForm { key: String, line: usize },

    #[error("line {line}: undefined label {label:?}")]
    UndefinedLabel { label: String, line: usize },

    /// Message text matches the source emulator's diagnostic verbatim: callers
    /// (and the regression test in `crates/assembler`) depend on this exact
    /// wording.
    #[error("Jump to {label} is too far")]
    JumpTooFar { label: String, line: usize },

    #[error("line {line}: operand {operand:?} is neither a register nor an immediate")]
    InvalidOperand { operand: String, line: usize },

    #[error("line {line}: {mnemonic} shift count must be the literal 1 or the CL register")]
    InvalidShiftCount { mnemonic: String, line: usize },
}

/// Everything the CPU's fetch/decode stage can reject. Unlike [`AssembleError`]
/// these never unwind: `Cpu::step` records them in `last_error` and halts
/// (§4.7, §7).
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    #[error("unknown opcode {opcode:#04X}")]
    UnknownOpcode { opcode: u8 },

    #[error("unknown extension {ext} for group opcode {opcode:#04X}")]
    UnknownGroupExtension { opcode: u8, ext: u8 },
}
