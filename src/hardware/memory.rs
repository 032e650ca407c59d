use crate::errors::LoadProgramError;
use crate::hardware::console::Console;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Where the PC points to after loading a program.
pub const PROGRAM_START: u16 = 0x3000;
pub const MEMORY_SIZE: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// Access to memory as seen by executing instructions.
///
/// Unlike plain indexing into [`Memory`], [`MemoryBus::read`] has a side effect:
/// reading [`MemoryMappedIOLocations::Kbsr`] polls the keyboard without blocking and,
/// if a key is pending, sets KBSR to `0x8000` and stores the key in
/// [`MemoryMappedIOLocations::Kbdr`]. Otherwise KBSR is cleared.
pub trait MemoryBus {
    fn read(&mut self, address: u16) -> u16;
    /// Unconditional store, mapped registers included.
    fn write(&mut self, address: u16, value: u16);
}

/// The LC-3 address space of 65536 words, zero initialized.
///
/// Indexing reads and writes raw values without any IO side effects.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory: {used} non zero words")
    }
}
impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        &mut self.data[usize::from(index)]
    }
}
impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
impl Memory {
    const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Copies `data` into memory starting at `origin`.
    ///
    /// # Errors
    /// - Program does not fit between `origin` and the end of memory
    pub fn load_image(&mut self, origin: u16, data: &[u16]) -> Result<(), LoadProgramError> {
        let start = usize::from(origin);
        let maximum_instructions = MEMORY_SIZE - start;
        if data.len() > maximum_instructions {
            return Err(LoadProgramError::ProgramTooLong {
                origin,
                actual_instructions: data.len(),
                maximum_instructions,
            });
        }
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Iterates over all words which are not zero together with their address.
    pub fn non_zero_words(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        (0..=u16::MAX)
            .zip(self.data.iter().copied())
            .filter(|(_, w)| *w != 0)
    }

    /// Refreshes KBSR and KBDR from the keyboard.
    fn poll_keyboard(&mut self, console: &mut impl Console) {
        let kbsr = MemoryMappedIOLocations::Kbsr as u16;
        if console.poll_key_available() {
            match console.read_char() {
                Ok(c) => {
                    self[kbsr] = Self::KEYBOARD_STATUS_REGISTER_SET;
                    self[MemoryMappedIOLocations::Kbdr as u16] = u16::from(c);
                }
                Err(e) => {
                    log::warn!("Reading announced key failed: {e}");
                    self[kbsr] = Self::KEYBOARD_STATUS_REGISTER_UNSET;
                }
            }
        } else {
            self[kbsr] = Self::KEYBOARD_STATUS_REGISTER_UNSET;
        }
    }
}

/// [`MemoryBus`] connecting [`Memory`] with the keyboard of a [`Console`].
pub struct Bus<'a, C: Console> {
    memory: &'a mut Memory,
    console: &'a mut C,
}
impl<'a, C: Console> Bus<'a, C> {
    pub const fn new(memory: &'a mut Memory, console: &'a mut C) -> Self {
        Self { memory, console }
    }
    pub fn memory(&self) -> &Memory {
        &*self.memory
    }
    pub fn console(&mut self) -> &mut C {
        &mut *self.console
    }
}
impl<C: Console> MemoryBus for Bus<'_, C> {
    fn read(&mut self, address: u16) -> u16 {
        if MemoryMappedIOLocations::n(address) == Some(MemoryMappedIOLocations::Kbsr) {
            self.memory.poll_keyboard(&mut *self.console);
        }
        self.memory[address]
    }
    fn write(&mut self, address: u16, value: u16) {
        self.memory[address] = value;
    }
}
