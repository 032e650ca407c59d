//! The LC-3 machine state: memory, registers and the attached console.
pub mod console;
pub mod memory;
pub mod registers;
