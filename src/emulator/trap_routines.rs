use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::console::Console;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use log::debug;
use std::io;
use std::ops::ControlFlow;

/// Trap vectors of the service routines this machine provides.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    /// get character from keyboard, not echoed onto the terminal
    GetC = 0x20,
    /// output a character
    Out = 0x21,
    /// output a word string
    PutS = 0x22,
    /// get character from keyboard, echoed onto the terminal
    In = 0x23,
    /// output a byte string
    PutSp = 0x24,
    /// halt the program
    Halt = 0x25,
}

const IN_PROMPT: &str = "Enter a character: ";

/// Executes the trap routine selected by the low 8 bits of `i`.
/// R7 must already hold the return address.
///
/// `Break(Ok(()))` means the program halted, `Break(Err(_))` that it failed.
/// An unknown vector fails with [`ExecutionError::UnknownTrapVector`], `address` is where the
/// TRAP instruction was fetched from.
pub fn dispatch(
    i: Instruction,
    address: u16,
    regs: &mut Registers,
    mem: &Memory,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    let vector = i.trap_vector();
    let Some(trap) = TrapVector::n(vector) else {
        return ControlFlow::Break(Err(ExecutionError::UnknownTrapVector { vector, address }));
    };
    debug!("TRAP {trap:?} at {address:#06X}");
    match trap {
        TrapVector::GetC => get_c(regs, console),
        TrapVector::Out => out(regs, console),
        TrapVector::PutS => put_s(regs, mem, console),
        TrapVector::In => in_trap(regs, console),
        TrapVector::PutSp => put_sp(regs, mem, console),
        TrapVector::Halt => halt(console),
    }
}

fn read_character_from_console(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>, u8> {
    match console.read_char() {
        Ok(c) => {
            regs.set(0, from_binary(u16::from(c)));
            regs.update_conditional_register(0);
            ControlFlow::Continue(c)
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    read_character_from_console(regs, console)?;
    ControlFlow::Continue(())
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(IN_PROMPT.bytes(), console)?;
    let c = read_character_from_console(regs, console)?;
    write_out([c], console)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(
    regs: &Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_out([low_byte(regs.get(0).as_binary())], console)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Truncation is what is expected here"
)]
const fn low_byte(input: u16) -> u8 {
    input as u8
}

fn put_one_char_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(low_byte(input));
}

fn put_two_chars_per_u16(input: u16, append_to: &mut Vec<u8>) {
    append_to.push(low_byte(input));
    let c = low_byte(input >> 8);
    if c != 0 {
        append_to.push(c);
    }
}

/// Collects the words from R0's address on up to, excluding, the first zero word.
fn put(
    regs: &Registers,
    mem: &Memory,
    console: &mut impl Console,
    handle_char: fn(u16, &mut Vec<u8>),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut s = Vec::with_capacity(120);
    // a string can at most span the whole address space once
    for _ in 0..=u16::MAX {
        let word = mem[address];
        if word == 0 {
            break;
        }
        handle_char(word, &mut s);
        address = address.wrapping_add(1);
    }
    write_out(s, console)
}

/// PUTS: print null-delimited char* from register 0's address
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, console, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates with a 0x000 char.
pub fn put_sp(
    regs: &Registers,
    mem: &Memory,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, console, put_two_chars_per_u16)
}

/// HALT: End program and print a message
pub fn halt(console: &mut impl Console) -> ControlFlow<Result<(), ExecutionError>> {
    write_out("HALT\n".bytes(), console)?;
    ControlFlow::Break(Ok(()))
}

fn write_out(
    message: impl IntoIterator<Item = u8>,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    let res = message
        .into_iter()
        .try_for_each(|c| console.write_char(c))
        .and_then(|()| console.flush());
    match res {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf<T>(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, T> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
