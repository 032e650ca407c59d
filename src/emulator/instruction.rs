use crate::errors::ExecutionError;
use crate::numbers::sign_extend;
use std::fmt::{Debug, Formatter};

/// The 16 LC-3 opcodes, bits 15 to 12 of an instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    Rti = 0x8,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Res = 0xD,
    Lea = 0xE,
    Trap = 0xF,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = to - from + 1;
        if width >= 16 {
            return self.0;
        }
        (self.0 >> from) & ((0b1 << width) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code_bits(self) -> u8 {
        self.get_bit_range_u8(12, 15, "Error parsing op_code")
    }
    /// Decodes the opcode.
    ///
    /// # Errors
    /// - [`ExecutionError::ReservedOpcode`] for RTI and RES, which this machine does not implement.
    ///   `address` is where the instruction was fetched from.
    pub fn op_code(self, address: u16) -> Result<Opcode, ExecutionError> {
        let bits = self.op_code_bits();
        match Opcode::n(bits) {
            Some(Opcode::Rti | Opcode::Res) | None => Err(ExecutionError::ReservedOpcode {
                opcode: bits,
                address,
            }),
            Some(op) => Ok(op),
        }
    }
    /// DR, or SR for the store instructions.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    /// SR1, or BaseR for JMP, JSRR, LDR and STR.
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// ADD and AND only.
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign extended imm5 of ADD and AND.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// JSR only, JSRR otherwise.
    #[must_use]
    pub fn is_long_branch(self) -> bool {
        self.get_bit(11)
    }
    /// The `nzp` mask of BR.
    #[must_use]
    pub fn condition_mask(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7, "Error parsing trap vector")
    }
    /// Offset to add to program counter PC or a base register, sign extended from `len` bits.
    /// Can be positive or negative, addition wraps.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        sign_extend(self.get_bit_range(0, len - 1), len)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:04b}, DR: {:03b}, PC_Off: {:09b}",
            self.op_code_bits(),
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1110_101_001010101);
        expect_that!(sut.op_code(0x3000), ok(eq(&Opcode::Lea)));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.op_code(0x3000), ok(eq(&Opcode::Add)));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));
    }

    #[gtest]
    pub fn test_offsets_are_sign_extended() {
        // LD - DR: 4, PC_OFFSET9: -0x44
        expect_that!(
            Instruction::from(0b0010_100_1_1011_1100).pc_offset(9),
            eq(0u16.wrapping_sub(0x44))
        );
        // LDR - OFFSET6: -32
        expect_that!(
            Instruction::from(0b0110_010_110_100000).pc_offset(6),
            eq(0u16.wrapping_sub(32))
        );
        // JSR - PC_OFFSET11: 0x1A1
        let jsr = Instruction::from(0b0100_1_00110100001);
        expect_that!(jsr.is_long_branch(), eq(true));
        expect_that!(jsr.pc_offset(11), eq(0x1A1));
        expect_that!(Instruction::from(0b0100_000_110_000000).is_long_branch(), eq(false));
    }

    #[gtest]
    pub fn test_trap_and_condition_fields() {
        let sut = Instruction::from(0xF025);
        expect_that!(sut.op_code(0x3000), ok(eq(&Opcode::Trap)));
        expect_that!(sut.trap_vector(), eq(0x25));
        expect_that!(Instruction::from(0b0000_101_000000011).condition_mask(), eq(0b101));
    }

    #[parameterized(
        rti = { 0x8000, 0x8 },
        res = { 0xD123, 0xD },
    )]
    fn test_reserved_opcodes(bits: u16, opcode: u8) {
        assert_that!(
            Instruction::from(bits).op_code(0x3004),
            err(eq(&ExecutionError::ReservedOpcode {
                opcode,
                address: 0x3004
            }))
        );
    }

    #[parameterized(
        register_mode = { 0b0001_000_001_0_00_010, false },
        immediate_mode = { 0b0001_000_001_1_00_010, true },
        register_mode_garbage = { 0b0101_111_111_0_11_111, false },
        immediate_mode_all_set = { 0b0101_111_111_1_11_111, true },
    )]
    fn test_immediate_mode_is_bit_5(bits: u16, immediate: bool) {
        assert_that!(Instruction::from(bits).is_immediate(), eq(immediate));
    }

    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
