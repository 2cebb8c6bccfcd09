// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Thin facade re-exporting `emu8086-isa`, `emu8086-assembler`, and
//! `emu8086-cpu`'s public surface for embedders. The DOM/CLI layer that
//! actually drives a `Cpu` lives outside this repository; this crate's only
//! addition is a `serde`-able snapshot of CPU state for that boundary.

pub use emu8086_assembler::{assemble, AssembledProgram};
pub use emu8086_cpu::{Cpu, InterruptEvent, InterruptHook, InterruptReason};
pub use emu8086_isa::{AssembleError, DecodeError, Flags, Reg16, Reg8, SegReg};

use serde::{Deserialize, Serialize};

/// A serializable snapshot of everything external collaborators are allowed
/// to read between `step()` calls (§5, §6): the register file, FLAGS, and
/// whether the CPU has halted (and why).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub ax: u16,
    pub cx: u16,
    pub dx: u16,
    pub bx: u16,
    pub sp: u16,
    pub bp: u16,
    pub si: u16,
    pub di: u16,
    pub es: u16,
    pub cs: u16,
    pub ss: u16,
    pub ds: u16,
    pub ip: u16,
    pub flags: u16,
    pub halted: bool,
    pub last_error: Option<String>,
}

impl CpuSnapshot {
    pub fn capture(cpu: &Cpu) -> Self {
        CpuSnapshot {
            ax: cpu.registers.get16(Reg16::AX),
            cx: cpu.registers.get16(Reg16::CX),
            dx: cpu.registers.get16(Reg16::DX),
            bx: cpu.registers.get16(Reg16::BX),
            sp: cpu.registers.get16(Reg16::SP),
            bp: cpu.registers.get16(Reg16::BP),
            si: cpu.registers.get16(Reg16::SI),
            di: cpu.registers.get16(Reg16::DI),
            es: cpu.registers.get_seg(SegReg::ES),
            cs: cpu.registers.get_seg(SegReg::CS),
            ss: cpu.registers.get_seg(SegReg::SS),
            ds: cpu.registers.get_seg(SegReg::DS),
            ip: cpu.registers.ip,
            flags: cpu.flags.0,
            halted: cpu.halted,
            last_error: cpu.last_error.map(|e| e.to_string()),
        }
    }
}

/// A serializable mirror of [`AssembledProgram`] for crossing a JSON-able
/// boundary (IPC, DOM embedding) without `emu8086-assembler` itself taking a
/// `serde` dependency it has no other use for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledProgramSnapshot {
    pub machine_code: Vec<u8>,
    pub symbol_table: std::collections::HashMap<String, i64>,
    pub hex_string: String,
}

impl From<&AssembledProgram> for AssembledProgramSnapshot {
    fn from(program: &AssembledProgram) -> Self {
        AssembledProgramSnapshot {
            machine_code: program.machine_code.clone(),
            symbol_table: program.symbol_table.clone(),
            hex_string: program.hex_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_captures_registers_and_halt_state() {
        let mut cpu = Cpu::new();
        cpu.load_program(&assemble("MOV AX, 5\nHLT").unwrap().machine_code, 0);
        while !cpu.halted {
            cpu.step();
        }
        let snapshot = CpuSnapshot::capture(&cpu);
        assert_eq!(snapshot.ax, 5);
        assert!(snapshot.halted);
        assert_eq!(snapshot.last_error, None);
    }

    #[test]
    fn assembled_program_snapshot_mirrors_the_source_program() {
        let program = assemble("MOV AX, 5\nHLT").unwrap();
        let snapshot = AssembledProgramSnapshot::from(&program);
        assert_eq!(snapshot.machine_code, program.machine_code);
        assert_eq!(snapshot.hex_string, program.hex_string);
    }
}
