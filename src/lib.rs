//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` interprets programs for the LC-3, a 16 bit educational computer with 8 general
//! purpose registers, a 65536 word address space, a memory mapped keyboard and trap routines
//! for console IO.
//! Usage starts with loading a program image via [`emulator::from_program`] and running it
//! with [`emulator::Emulator::execute`] on a [`hardware::console::Console`].
//!
//!  # Example
//! ```
//! use lc3_vm::emulator;
//! let mut emu = emulator::from_program_bytes(&[
//!     0x30, 0x00, // .ORIG x3000
//!     0x50, 0x20, // AND R0, R0, #0
//!     0x10, 0x25, // ADD R0, R0, #5
//! ]).unwrap();
//! assert_eq!(emu.memory()[0x3001], 0x1025);
//! assert_eq!(emu.registers().pc().as_binary(), 0x3000);
//! ```
//! # Errors
//! - Loading: program is missing valid .ORIG header, is not made of whole words or does not fit
//!   into memory
//! - Execution: reserved opcodes RTI and RES, unknown trap vectors, console IO failures and
//!   interrupts stop the program

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;
