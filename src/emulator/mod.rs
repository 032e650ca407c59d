//! The LC-3 interpreter: program loading and the fetch, decode and execute loop.
pub mod dump;
pub mod instruction;
mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::dump::UnknownTrapObserver;
use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::console::Console;
use crate::hardware::memory::{Bus, Memory, MemoryBus};
use crate::hardware::registers::Registers;
use log::{debug, error, info, trace, warn};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

/// Instructions executed between two looks at the console input for CTRL-C.
const INTERRUPT_CHECK_INTERVAL: u32 = 1 << 10;

/// Whether the machine still fetches instructions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

/// The public facing emulator used to run LC-3 programs.
///
/// Owns all machine state. Console IO is attached per call of [`Emulator::execute`].
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    run_state: RunState,
    unknown_trap_observer: Option<Box<dyn UnknownTrapObserver>>,
}
impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Emulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emulator")
            .field("memory", &self.memory)
            .field("registers", &self.registers)
            .field("run_state", &self.run_state)
            .finish_non_exhaustive()
    }
}

/// Creates an [`Emulator`] and loads the program image at `path`.
///
/// # Errors
/// See [`Emulator::load_program_file`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    from_programs(&[path])
}

/// Creates an [`Emulator`] and loads the program images in order, later images overwrite
/// earlier ones where they overlap.
///
/// # Errors
/// See [`Emulator::load_program_file`], the first failing image is reported.
pub fn from_programs(paths: &[impl AsRef<Path>]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    for path in paths {
        emu.load_program_file(path)?;
    }
    Ok(emu)
}

/// Creates an [`Emulator`] from the bytes of a program image.
///
/// # Errors
/// See [`Emulator::load_program_bytes`]
pub fn from_program_bytes(bytes: &[u8]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_program_bytes(bytes)?;
    Ok(emu)
}

impl Emulator {
    /// Zeroed memory, registers according to [`Registers::new`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            registers: Registers::new(),
            run_state: RunState::Running,
            unknown_trap_observer: None,
        }
    }

    /// Loads a program image file.
    ///
    /// # Errors
    /// - File cannot be read
    /// - See [`Emulator::load_program_bytes`]
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadProgramError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| LoadProgramError::ProgramLoadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.load_program_bytes(&bytes)
    }

    /// Loads a program image: big endian 16 bit words, the first one being the `.ORIG`
    /// address the rest is copied to.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header
    /// - Program has an odd number of bytes
    /// - Program does not fit into memory after its origin
    pub fn load_program_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadProgramError> {
        if bytes.len() % 2 != 0 {
            if bytes.len() == 1 {
                return Err(LoadProgramError::ProgramMissingOrigHeader);
            }
            return Err(LoadProgramError::ProgramNotWordAligned {
                byte_count: bytes.len(),
            });
        }
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        self.load_program(&words)
    }

    /// Loads a program given as words, the first one being the `.ORIG` address.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header
    /// - Program does not fit into memory after its origin
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), LoadProgramError> {
        let Some((origin, rest)) = program.split_first() else {
            return Err(LoadProgramError::ProgramMissingOrigHeader);
        };
        self.memory.load_image(*origin, rest)?;
        debug!("Loaded {} words at {origin:#06X}", rest.len());
        Ok(())
    }

    /// Attaches an observer notified before execution stops on an unknown trap vector.
    pub fn set_unknown_trap_observer(&mut self, observer: Box<dyn UnknownTrapObserver>) {
        self.unknown_trap_observer = Some(observer);
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Resets the registers to their initial state so the loaded program can run again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
        self.run_state = RunState::Running;
    }

    /// Runs the loaded program until it halts or fails.
    ///
    /// Between instructions [`Console::is_interrupted`] is checked, every
    /// [`INTERRUPT_CHECK_INTERVAL`] instructions the console input is searched for CTRL-C with
    /// [`Console::check_interrupt`].
    ///
    /// # Errors
    /// - [`ExecutionError::ReservedOpcode`] for RTI and RES
    /// - [`ExecutionError::UnknownTrapVector`]
    /// - [`ExecutionError::IOInputOutputError`] if the console failed
    /// - [`ExecutionError::Interrupted`]
    pub fn execute(&mut self, console: &mut impl Console) -> Result<(), ExecutionError> {
        let mut executed: u32 = 0;
        loop {
            let interrupted = if executed.is_multiple_of(INTERRUPT_CHECK_INTERVAL) {
                console.check_interrupt()
            } else {
                console.is_interrupted()
            };
            executed = executed.wrapping_add(1);
            if interrupted {
                warn!(
                    "Interrupted before {:#06X}",
                    self.registers.pc().as_binary()
                );
                self.run_state = RunState::Halted;
                return Err(ExecutionError::Interrupted);
            }
            if let ControlFlow::Break(mut res) = self.step(console) {
                // CTRL-C while a trap waits for input surfaces as a failed read
                if matches!(res, Err(ExecutionError::IOInputOutputError(_)))
                    && console.is_interrupted()
                {
                    res = Err(ExecutionError::Interrupted);
                }
                match &res {
                    Ok(()) => info!("Program halted"),
                    Err(e) => error!("Program failed: {e}"),
                }
                return res;
            }
        }
    }

    /// Fetches, decodes and executes a single instruction.
    ///
    /// `Break` means no further instruction is executed, see [`Emulator::execute`].
    pub fn step(&mut self, console: &mut impl Console) -> ControlFlow<Result<(), ExecutionError>> {
        if self.run_state == RunState::Halted {
            return ControlFlow::Break(Ok(()));
        }
        let res = self.execute_next_instruction(console);
        if res.is_break() {
            self.run_state = RunState::Halted;
        }
        res
    }

    fn execute_next_instruction(
        &mut self,
        console: &mut impl Console,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let address = self.registers.inc_pc();
        let i = Instruction::from(Bus::new(&mut self.memory, console).read(address));
        let op = match i.op_code(address) {
            Ok(op) => op,
            Err(e) => return ControlFlow::Break(Err(e)),
        };
        trace!("{address:#06X}: {op:?} {i:?}");
        let regs = &mut self.registers;
        let mut bus = Bus::new(&mut self.memory, console);
        match op {
            Opcode::Br => opcodes::br(i, regs),
            Opcode::Add => opcodes::add(i, regs),
            Opcode::Ld => opcodes::ld(i, regs, &mut bus),
            Opcode::St => opcodes::st(i, regs, &mut bus),
            Opcode::Jsr => opcodes::jsr(i, regs),
            Opcode::And => opcodes::and(i, regs),
            Opcode::Ldr => opcodes::ldr(i, regs, &mut bus),
            Opcode::Str => opcodes::str(i, regs, &mut bus),
            Opcode::Not => opcodes::not(i, regs),
            Opcode::Ldi => opcodes::ldi(i, regs, &mut bus),
            Opcode::Sti => opcodes::sti(i, regs, &mut bus),
            Opcode::Jmp => opcodes::jmp_or_ret(i, regs),
            Opcode::Lea => opcodes::lea(i, regs),
            Opcode::Trap => return self.trap(i, address, console),
            Opcode::Rti | Opcode::Res => {
                return ControlFlow::Break(Err(ExecutionError::ReservedOpcode {
                    opcode: i.op_code_bits(),
                    address,
                }));
            }
        }
        ControlFlow::Continue(())
    }

    fn trap(
        &mut self,
        i: Instruction,
        address: u16,
        console: &mut impl Console,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        self.registers.set(7, self.registers.pc());
        let res = trap_routines::dispatch(i, address, &mut self.registers, &self.memory, console);
        if let ControlFlow::Break(Err(ExecutionError::UnknownTrapVector { vector, .. })) = &res
            && let Some(observer) = self.unknown_trap_observer.as_mut()
            && let Err(e) = observer.on_unknown_trap(*vector, &self.registers, &self.memory)
        {
            warn!("Unknown trap observer failed: {e}");
        }
        res
    }
}
