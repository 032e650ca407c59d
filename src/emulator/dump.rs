//! Diagnostic dumps of the machine state when a program executes an unknown trap vector.
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use log::info;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Gets notified before execution stops because of an unknown trap vector.
pub trait UnknownTrapObserver {
    /// # Errors
    /// - the observer failed, execution stops regardless
    fn on_unknown_trap(
        &mut self,
        vector: u8,
        registers: &Registers,
        memory: &Memory,
    ) -> io::Result<()>;
}

/// Writes all non zero memory words and registers into numbered files
/// `memory_dump_<n>.txt` inside a directory.
#[derive(Debug)]
pub struct MemoryDump {
    directory: PathBuf,
    counter: u32,
}

impl MemoryDump {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            counter: 0,
        }
    }
    /// Path of the file the next dump is written to.
    #[must_use]
    pub fn next_path(&self) -> PathBuf {
        self.directory
            .join(format!("memory_dump_{}.txt", self.counter + 1))
    }
}

/// One line per non zero word as `M<address>: <value>`, then the registers.
///
/// # Errors
/// - writing to `out` failed
pub fn write_dump(
    out: &mut impl Write,
    vector: u8,
    registers: &Registers,
    memory: &Memory,
) -> io::Result<()> {
    writeln!(out, "TRAP: {vector:#04X}")?;
    for (address, value) in memory.non_zero_words() {
        writeln!(out, "M{address:#06X}: {value:#06X}")?;
    }
    for r in 0..8 {
        writeln!(out, "R{r}: {:#06X}", registers.get(r).as_binary())?;
    }
    writeln!(out, "PC: {:#06X}", registers.pc().as_binary())?;
    writeln!(out, "COND: {:?}", registers.get_conditional_register())
}

impl UnknownTrapObserver for MemoryDump {
    fn on_unknown_trap(
        &mut self,
        vector: u8,
        registers: &Registers,
        memory: &Memory,
    ) -> io::Result<()> {
        let path = self.next_path();
        let mut out = BufWriter::new(File::create(&path)?);
        write_dump(&mut out, vector, registers, memory)?;
        out.flush()?;
        self.counter += 1;
        info!("Wrote memory dump to {}", path.display());
        Ok(())
    }
}
