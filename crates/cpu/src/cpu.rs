// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Fetch–decode–execute (§4.7). `Cpu::step` fetches one opcode byte, fetches a
//! ModR/M byte and any displacement/immediate the opcode requires, resolves
//! memory operands through [`crate::effective_address`], and dispatches to
//! [`crate::alu`] or the stack/branch helpers below.

use crate::alu;
use crate::effective_address;
use crate::interrupt::{InterruptEvent, InterruptHook, InterruptReason};
use crate::memory::Memory;
use crate::registers::RegisterFile;
use emu8086_isa::{opcodes, DecodeError, Flags, Reg16, Reg8, SegReg};

/// A decoded ModR/M `rm` operand: either a register or a resolved memory
/// location. Kept alongside the raw `reg` field so callers can read/write the
/// same location twice (read-modify-write) without re-decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rm {
    Register(Reg16),
    Memory { segment: u16, offset: u16 },
}

struct ModRm {
    reg: u8,
    rm: Rm,
}

pub struct Cpu {
    pub registers: RegisterFile,
    pub flags: Flags,
    pub memory: Memory,
    pub halted: bool,
    pub last_error: Option<DecodeError>,
    interrupt_hook: Option<InterruptHook>,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            registers: RegisterFile::new(),
            flags: Flags::default(),
            memory: Memory::new(),
            halted: false,
            last_error: None,
            interrupt_hook: None,
        }
    }

    pub fn set_interrupt_hook(&mut self, hook: InterruptHook) {
        self.interrupt_hook = Some(hook);
    }

    /// Copies `bytes` to `segment*16` and resets CS:IP to `segment:0` — the
    /// "assembled verbatim, copied verbatim" guarantee from §6.
    pub fn load_program(&mut self, bytes: &[u8], segment: u16) {
        self.memory.load(segment, bytes);
        self.registers.set_seg(SegReg::CS, segment);
        self.registers.ip = 0;
    }

    pub fn read_byte(&self, segment: u16, offset: u16) -> u8 {
        self.memory.read_byte(segment, offset)
    }

    pub fn write_byte(&mut self, segment: u16, offset: u16, value: u8) {
        self.memory.write_byte(segment, offset, value);
    }

    pub fn read_word(&self, segment: u16, offset: u16) -> u16 {
        self.memory.read_word(segment, offset)
    }

    pub fn write_word(&mut self, segment: u16, offset: u16, value: u16) {
        self.memory.write_word(segment, offset, value);
    }

    /// A no-op once `halted`. Otherwise fetches and executes exactly one
    /// instruction.
    pub fn step(&mut self) {
        if self.halted {
            return;
        }
        let opcode = self.fetch_byte();
        self.execute(opcode);
    }

    fn fetch_byte(&mut self) -> u8 {
        let cs = self.registers.get_seg(SegReg::CS);
        let byte = self.memory.read_byte(cs, self.registers.ip);
        self.registers.ip = self.registers.ip.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let low = self.fetch_byte();
        let high = self.fetch_byte();
        u16::from_le_bytes([low, high])
    }

    fn decode_modrm(&mut self) -> ModRm {
        let byte = self.fetch_byte();
        let mode = (byte >> 6) & 0b11;
        let reg = (byte >> 3) & 0b111;
        let rm_field = byte & 0b111;

        if mode == 0b11 {
            return ModRm { reg, rm: Rm::Register(Reg16::from_index(rm_field).expect("3-bit index")) };
        }

        let displacement = match (mode, rm_field) {
            (0, 6) => self.fetch_word(),
            (0, _) => 0,
            (1, _) => self.fetch_byte() as i8 as i16 as u16,
            (2, _) => self.fetch_word(),
            _ => unreachable!("mod is masked to 2 bits"),
        };
        let ea = effective_address::resolve(&self.registers, mode, rm_field, displacement);
        let segment = self.registers.get_seg(ea.default_segment);
        ModRm { reg, rm: Rm::Memory { segment, offset: ea.offset } }
    }

    fn read_rm(&self, rm: Rm) -> u16 {
        match rm {
            Rm::Register(r) => self.registers.get16(r),
            Rm::Memory { segment, offset } => self.memory.read_word(segment, offset),
        }
    }

    fn write_rm(&mut self, rm: Rm, value: u16) {
        match rm {
            Rm::Register(r) => self.registers.set16(r, value),
            Rm::Memory { segment, offset } => self.memory.write_word(segment, offset, value),
        }
    }

    fn push16(&mut self, value: u16) {
        let ss = self.registers.get_seg(SegReg::SS);
        let new_sp = self.registers.get16(Reg16::SP).wrapping_sub(2);
        self.registers.set16(Reg16::SP, new_sp);
        self.memory.write_word(ss, new_sp, value);
    }

    fn pop16(&mut self) -> u16 {
        let ss = self.registers.get_seg(SegReg::SS);
        let sp = self.registers.get16(Reg16::SP);
        let value = self.memory.read_word(ss, sp);
        self.registers.set16(Reg16::SP, sp.wrapping_add(2));
        value
    }

    fn trap(&mut self, reason: InterruptReason) {
        self.registers.ip = self.registers.ip.wrapping_sub(1);
        let event = InterruptEvent { vector: 0, reason, ip: self.registers.ip };
        tracing::warn!(?reason, ip = self.registers.ip, "interrupt 0 trap");
        if let Some(hook) = self.interrupt_hook.as_mut() {
            hook(event);
        }
    }

    fn fail_unknown_opcode(&mut self, opcode: u8) {
        self.last_error = Some(DecodeError::UnknownOpcode { opcode });
        self.halted = true;
        tracing::warn!(opcode, "unknown opcode, halting");
    }

    fn fail_unknown_extension(&mut self, opcode: u8, ext: u8) {
        self.last_error = Some(DecodeError::UnknownGroupExtension { opcode, ext });
        self.halted = true;
        tracing::warn!(opcode, ext, "unknown group extension, halting");
    }

    fn jump_if(&mut self, condition: bool) {
        let disp = self.fetch_byte();
        if condition {
            self.registers.ip = self.registers.ip.wrapping_add(disp as i8 as i16 as u16);
        }
    }

    fn string_step(&mut self) -> u16 {
        if self.flags.df() {
            1u16.wrapping_neg()
        } else {
            1
        }
    }

    fn execute(&mut self, opcode: u8) {
        match opcode {
            opcodes::MOV_REG_REG => {
                let modrm = self.decode_modrm();
                let src = self.registers.get16(Reg16::from_index(modrm.reg).expect("3-bit index"));
                self.write_rm(modrm.rm, src);
            }

            opcodes::LEA => {
                let modrm = self.decode_modrm();
                let offset = match modrm.rm {
                    Rm::Memory { offset, .. } => offset,
                    Rm::Register(_) => 0,
                };
                self.registers.set16(Reg16::from_index(modrm.reg).expect("3-bit index"), offset);
            }

            opcodes::XCHG_REG_REG => {
                let modrm = self.decode_modrm();
                let reg = Reg16::from_index(modrm.reg).expect("3-bit index");
                let a = self.registers.get16(reg);
                let b = self.read_rm(modrm.rm);
                self.registers.set16(reg, b);
                self.write_rm(modrm.rm, a);
            }

            opcodes::ADD_REG_REG => self.alu_reg_reg(alu::add16),
            opcodes::SUB_REG_REG => self.alu_reg_reg(alu::sub16),
            opcodes::AND_REG_REG => self.alu_reg_reg(alu::and16),
            opcodes::OR_REG_REG => self.alu_reg_reg(alu::or16),
            opcodes::XOR_REG_REG => self.alu_reg_reg(alu::xor16),
            opcodes::CMP_REG_REG => {
                let modrm = self.decode_modrm();
                let reg_val = self.registers.get16(Reg16::from_index(modrm.reg).expect("3-bit index"));
                let rm_val = self.read_rm(modrm.rm);
                alu::cmp16(&mut self.flags, rm_val, reg_val);
            }
            opcodes::TEST_REG_REG => {
                let modrm = self.decode_modrm();
                let reg_val = self.registers.get16(Reg16::from_index(modrm.reg).expect("3-bit index"));
                let rm_val = self.read_rm(modrm.rm);
                alu::test16(&mut self.flags, rm_val, reg_val);
            }

            opcodes::ADD_AX_IMM => self.alu_ax_imm(alu::add16),
            opcodes::SUB_AX_IMM => self.alu_ax_imm(alu::sub16),
            opcodes::AND_AX_IMM => self.alu_ax_imm(alu::and16),
            opcodes::OR_AX_IMM => self.alu_ax_imm(alu::or16),
            opcodes::XOR_AX_IMM => self.alu_ax_imm(alu::xor16),
            opcodes::CMP_AX_IMM => {
                let imm = self.fetch_word();
                let ax = self.registers.get16(Reg16::AX);
                alu::cmp16(&mut self.flags, ax, imm);
            }
            opcodes::TEST_AX_IMM => {
                let imm = self.fetch_word();
                let ax = self.registers.get16(Reg16::AX);
                alu::test16(&mut self.flags, ax, imm);
            }

            opcodes::GROUP_ALU_IMM => self.group_alu_imm(),
            opcodes::GROUP_F7 => self.group_f7(),
            opcodes::GROUP_SHIFT_BY_ONE => self.group_shift(opcodes::GROUP_SHIFT_BY_ONE, 1),
            opcodes::GROUP_SHIFT_BY_CL => {
                let count = self.registers.get8(Reg8::CL);
                self.group_shift(opcodes::GROUP_SHIFT_BY_CL, count);
            }

            op if (opcodes::INC_REG_BASE..opcodes::INC_REG_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::INC_REG_BASE).expect("3-bit index");
                let value = self.registers.get16(reg);
                let result = alu::inc16(&mut self.flags, value);
                self.registers.set16(reg, result);
            }
            op if (opcodes::DEC_REG_BASE..opcodes::DEC_REG_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::DEC_REG_BASE).expect("3-bit index");
                let value = self.registers.get16(reg);
                let result = alu::dec16(&mut self.flags, value);
                self.registers.set16(reg, result);
            }

            op if (opcodes::PUSH_REG_BASE..opcodes::PUSH_REG_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::PUSH_REG_BASE).expect("3-bit index");
                let value = self.registers.get16(reg);
                self.push16(value);
            }
            op if (opcodes::POP_REG_BASE..opcodes::POP_REG_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::POP_REG_BASE).expect("3-bit index");
                let value = self.pop16();
                self.registers.set16(reg, value);
            }
            op if (opcodes::MOV_REG_IMM_BASE..opcodes::MOV_REG_IMM_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::MOV_REG_IMM_BASE).expect("3-bit index");
                let value = self.fetch_word();
                self.registers.set16(reg, value);
            }
            op if (opcodes::XCHG_AX_REG_BASE..opcodes::XCHG_AX_REG_BASE + 8).contains(&op) => {
                let reg = Reg16::from_index(op - opcodes::XCHG_AX_REG_BASE).expect("3-bit index");
                if reg != Reg16::AX {
                    let ax = self.registers.get16(Reg16::AX);
                    let other = self.registers.get16(reg);
                    self.registers.set16(Reg16::AX, other);
                    self.registers.set16(reg, ax);
                }
            }

            opcodes::MOVSB => {
                let ds = self.registers.get_seg(SegReg::DS);
                let es = self.registers.get_seg(SegReg::ES);
                let si = self.registers.get16(Reg16::SI);
                let di = self.registers.get16(Reg16::DI);
                let byte = self.memory.read_byte(ds, si);
                self.memory.write_byte(es, di, byte);
                let step = self.string_step();
                self.registers.set16(Reg16::SI, si.wrapping_add(step));
                self.registers.set16(Reg16::DI, di.wrapping_add(step));
            }
            opcodes::LODSB => {
                let ds = self.registers.get_seg(SegReg::DS);
                let si = self.registers.get16(Reg16::SI);
                let byte = self.memory.read_byte(ds, si);
                self.registers.set8(Reg8::AL, byte);
                let step = self.string_step();
                self.registers.set16(Reg16::SI, si.wrapping_add(step));
            }
            opcodes::STOSB => {
                let es = self.registers.get_seg(SegReg::ES);
                let di = self.registers.get16(Reg16::DI);
                let byte = self.registers.get8(Reg8::AL);
                self.memory.write_byte(es, di, byte);
                let step = self.string_step();
                self.registers.set16(Reg16::DI, di.wrapping_add(step));
            }
            opcodes::CMPSB => {
                let ds = self.registers.get_seg(SegReg::DS);
                let es = self.registers.get_seg(SegReg::ES);
                let si = self.registers.get16(Reg16::SI);
                let di = self.registers.get16(Reg16::DI);
                let a = self.memory.read_byte(ds, si);
                let b = self.memory.read_byte(es, di);
                self.cmp8(a, b);
                let step = self.string_step();
                self.registers.set16(Reg16::SI, si.wrapping_add(step));
                self.registers.set16(Reg16::DI, di.wrapping_add(step));
            }

            opcodes::JMP_NEAR => {
                let disp = self.fetch_word();
                self.registers.ip = self.registers.ip.wrapping_add(disp);
            }
            opcodes::CALL_NEAR => {
                let disp = self.fetch_word();
                let return_ip = self.registers.ip;
                self.push16(return_ip);
                self.registers.ip = return_ip.wrapping_add(disp);
            }
            opcodes::RET => {
                let ip = self.pop16();
                self.registers.ip = ip;
            }

            opcodes::JE_JZ => {
                let cond = self.flags.zf();
                self.jump_if(cond);
            }
            opcodes::JNE_JNZ => {
                let cond = !self.flags.zf();
                self.jump_if(cond);
            }
            opcodes::JC => {
                let cond = self.flags.cf();
                self.jump_if(cond);
            }
            opcodes::JNC => {
                let cond = !self.flags.cf();
                self.jump_if(cond);
            }

            opcodes::NOP => {}
            opcodes::HLT => self.halted = true,
            opcodes::CLC => self.flags.set_cf(false),
            opcodes::STC => self.flags.set_cf(true),
            opcodes::CMC => {
                let cf = self.flags.cf();
                self.flags.set_cf(!cf);
            }
            opcodes::PUSHF => {
                let word = self.flags.pushed_word();
                self.push16(word);
            }
            opcodes::POPF => {
                let word = self.pop16();
                self.flags.load_popped_word(word);
            }
            opcodes::CLD => self.flags.set_df(false),
            opcodes::STD => self.flags.set_df(true),

            _ => self.fail_unknown_opcode(opcode),
        }
    }

    fn alu_reg_reg(&mut self, op: fn(&mut Flags, u16, u16) -> u16) {
        let modrm = self.decode_modrm();
        let reg_val = self.registers.get16(Reg16::from_index(modrm.reg).expect("3-bit index"));
        let rm_val = self.read_rm(modrm.rm);
        let result = op(&mut self.flags, rm_val, reg_val);
        self.write_rm(modrm.rm, result);
    }

    fn alu_ax_imm(&mut self, op: fn(&mut Flags, u16, u16) -> u16) {
        let imm = self.fetch_word();
        let ax = self.registers.get16(Reg16::AX);
        let result = op(&mut self.flags, ax, imm);
        self.registers.set16(Reg16::AX, result);
    }

    fn cmp8(&mut self, a: u8, b: u8) {
        let result = a.wrapping_sub(b);
        self.flags.set_cf(a < b);
        self.flags.set_af((a & 0xF) < (b & 0xF));
        self.flags.set_of((a ^ b) & (a ^ result) & 0x80 != 0);
        self.flags.set_zf(result == 0);
        self.flags.set_sf(result & 0x80 != 0);
        self.flags.set_pf(result.count_ones() % 2 == 0);
    }

    fn group_alu_imm(&mut self) {
        let modrm = self.decode_modrm();
        let imm = self.fetch_word();
        let value = self.read_rm(modrm.rm);
        use emu8086_isa::opcodes::alu_imm_ext::*;
        let result = match modrm.reg {
            ADD => Some(alu::add16(&mut self.flags, value, imm)),
            OR => Some(alu::or16(&mut self.flags, value, imm)),
            AND => Some(alu::and16(&mut self.flags, value, imm)),
            SUB => Some(alu::sub16(&mut self.flags, value, imm)),
            XOR => Some(alu::xor16(&mut self.flags, value, imm)),
            CMP => {
                alu::cmp16(&mut self.flags, value, imm);
                None
            }
            ext => {
                self.fail_unknown_extension(opcodes::GROUP_ALU_IMM, ext);
                return;
            }
        };
        if let Some(result) = result {
            self.write_rm(modrm.rm, result);
        }
    }

    fn group_f7(&mut self) {
        let modrm = self.decode_modrm();
        use emu8086_isa::opcodes::f7_ext::*;
        match modrm.reg {
            TEST => {
                let imm = self.fetch_word();
                let value = self.read_rm(modrm.rm);
                alu::test16(&mut self.flags, value, imm);
            }
            NOT => {
                let value = self.read_rm(modrm.rm);
                self.write_rm(modrm.rm, alu::not16(value));
            }
            NEG => {
                let value = self.read_rm(modrm.rm);
                let result = alu::neg16(&mut self.flags, value);
                self.write_rm(modrm.rm, result);
            }
            MUL => {
                let operand = self.read_rm(modrm.rm);
                let ax = self.registers.get16(Reg16::AX);
                let (dx, ax) = alu::mul16(&mut self.flags, ax, operand);
                self.registers.set16(Reg16::DX, dx);
                self.registers.set16(Reg16::AX, ax);
            }
            IMUL => {
                let operand = self.read_rm(modrm.rm);
                let ax = self.registers.get16(Reg16::AX);
                let (dx, ax) = alu::imul16(&mut self.flags, ax, operand);
                self.registers.set16(Reg16::DX, dx);
                self.registers.set16(Reg16::AX, ax);
            }
            DIV => {
                let operand = self.read_rm(modrm.rm);
                let dx = self.registers.get16(Reg16::DX);
                let ax = self.registers.get16(Reg16::AX);
                match alu::div16(dx, ax, operand) {
                    Some(result) => {
                        self.registers.set16(Reg16::AX, result.quotient);
                        self.registers.set16(Reg16::DX, result.remainder);
                    }
                    None => {
                        let reason = if operand == 0 {
                            InterruptReason::DivideByZero
                        } else {
                            InterruptReason::DivisionOverflow
                        };
                        self.trap(reason);
                    }
                }
            }
            IDIV => {
                let operand = self.read_rm(modrm.rm);
                let dx = self.registers.get16(Reg16::DX);
                let ax = self.registers.get16(Reg16::AX);
                match alu::idiv16(dx, ax, operand) {
                    Some(result) => {
                        self.registers.set16(Reg16::AX, result.quotient);
                        self.registers.set16(Reg16::DX, result.remainder);
                    }
                    None => {
                        let reason = if operand == 0 {
                            InterruptReason::DivideByZero
                        } else {
                            InterruptReason::DivisionOverflow
                        };
                        self.trap(reason);
                    }
                }
            }
            ext => self.fail_unknown_extension(opcodes::GROUP_F7, ext),
        }
    }

    fn group_shift(&mut self, opcode: u8, count: u8) {
        let modrm = self.decode_modrm();
        let ext = modrm.reg;
        if ext == 6 {
            self.fail_unknown_extension(opcode, ext);
            return;
        }
        let value = self.read_rm(modrm.rm);
        let result = alu::shift_or_rotate(&mut self.flags, ext, value, count);
        self.write_rm(modrm.rm, result);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu8086_isa::Reg16;

    fn run_to_halt(cpu: &mut Cpu) {
        let mut guard = 0;
        while !cpu.halted {
            cpu.step();
            guard += 1;
            assert!(guard < 10_000, "program did not halt");
        }
    }

    #[test]
    fn mov_add_hlt_scenario() {
        let mut cpu = Cpu::new();
        cpu.load_program(&[0xB8, 0x05, 0x00, 0x05, 0x02, 0x00, 0xF4], 0);
        run_to_halt(&mut cpu);
        assert_eq!(cpu.registers.get16(Reg16::AX), 7);
        assert_eq!(cpu.registers.ip, 7);
        assert!(cpu.halted);
    }

    #[test]
    fn mov_dec_jnz_loop_scenario() {
        let mut cpu = Cpu::new();
        // MOV CX,3 ; L1: DEC CX ; JNZ L1 ; HLT
        cpu.load_program(&[0xB9, 0x03, 0x00, 0x49, 0x75, 0xFD, 0xF4], 0);
        run_to_halt(&mut cpu);
        assert_eq!(cpu.registers.get16(Reg16::CX), 0);
        assert!(cpu.flags.zf());
    }

    #[test]
    fn overflow_scenario_sets_carry_zero_and_af() {
        let mut cpu = Cpu::new();
        // MOV AX,0xFFFF ; ADD AX,1 ; HLT
        cpu.load_program(&[0xB8, 0xFF, 0xFF, 0x05, 0x01, 0x00, 0xF4], 0);
        run_to_halt(&mut cpu);
        assert_eq!(cpu.registers.get16(Reg16::AX), 0);
        assert!(cpu.flags.zf());
        assert!(cpu.flags.cf());
        assert!(!cpu.flags.of());
        assert!(cpu.flags.af());
    }

    #[test]
    fn div_scenario() {
        let mut cpu = Cpu::new();
        // MOV AX,0x10 ; MOV DX,0 ; MOV BX,2 ; DIV BX ; HLT
        cpu.load_program(
            &[
                0xB8, 0x10, 0x00, // MOV AX, 0x10
                0xBA, 0x00, 0x00, // MOV DX, 0
                0xBB, 0x02, 0x00, // MOV BX, 2
                0xF7, 0xF3, // DIV BX
                0xF4,
            ],
            0,
        );
        run_to_halt(&mut cpu);
        assert_eq!(cpu.registers.get16(Reg16::AX), 0x0008);
        assert_eq!(cpu.registers.get16(Reg16::DX), 0x0000);
    }

    #[test]
    fn push_pop_round_trip_scenario() {
        let mut cpu = Cpu::new();
        cpu.registers.set16(Reg16::AX, 0xBEEF);
        let initial_sp = cpu.registers.get16(Reg16::SP);
        // PUSH AX ; POP BX
        cpu.load_program(&[0x50, 0x5B], 0);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.registers.get16(Reg16::BX), 0xBEEF);
        assert_eq!(cpu.registers.get16(Reg16::SP), initial_sp);
    }

    #[test]
    fn divide_by_zero_traps_through_the_interrupt_hook() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<InterruptReason>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in_hook = seen.clone();
        let mut cpu = Cpu::new();
        cpu.set_interrupt_hook(Box::new(move |event| seen_in_hook.borrow_mut().push(event.reason)));
        cpu.registers.set16(Reg16::AX, 10);
        cpu.registers.set16(Reg16::DX, 0);
        cpu.registers.set16(Reg16::BX, 0);
        // DIV BX, with BX = 0
        cpu.load_program(&[0xF7, 0xF3], 0);
        cpu.step();
        assert_eq!(*seen.borrow(), vec![InterruptReason::DivideByZero]);
    }

    #[test]
    fn unknown_opcode_halts_and_records_last_error() {
        let mut cpu = Cpu::new();
        cpu.load_program(&[0xF0], 0); // LOCK prefix: not a supported opcode here
        cpu.step();
        assert!(cpu.halted);
        assert!(matches!(cpu.last_error, Some(DecodeError::UnknownOpcode { opcode: 0xF0 })));
    }

    #[test]
    fn lea_loads_the_computed_offset_without_touching_memory() {
        let mut cpu = Cpu::new();
        // LEA BX, [0x1234]  (mod=00, reg=BX(3), rm=110) + disp16
        cpu.load_program(&[0x8D, 0b00_011_110, 0x34, 0x12], 0);
        cpu.step();
        assert_eq!(cpu.registers.get16(Reg16::BX), 0x1234);
    }
}
