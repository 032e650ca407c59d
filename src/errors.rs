use displaydoc::Display;
use std::error::Error;

/// Errors while loading a program image into memory.
#[derive(Display, Debug, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
    /// Program is not made of 16 bit words, got {byte_count} bytes
    ProgramNotWordAligned { byte_count: usize },
    /// Program too long for origin {origin:#06X}, got {actual_instructions} u16 instructions while limit is {maximum_instructions}
    ProgramTooLong {
        origin: u16,
        actual_instructions: usize,
        maximum_instructions: usize,
    },
    /// Program could not be read from {path}: {message}
    ProgramLoadError { path: String, message: String },
}
impl Error for LoadProgramError {}

/// Errors which stop a running program.
#[derive(Display, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    /// Reserved opcode {opcode:#06b} at address {address:#06X}
    ReservedOpcode { opcode: u8, address: u16 },
    /// Unknown trap vector {vector:#04X} at address {address:#06X}
    UnknownTrapVector { vector: u8, address: u16 },
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Execution interrupted by user
    Interrupted,
}
impl Error for ExecutionError {}

impl From<std::io::Error> for ExecutionError {
    fn from(e: std::io::Error) -> Self {
        Self::IOInputOutputError(e.to_string())
    }
}
