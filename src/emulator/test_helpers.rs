use crate::hardware::console::Console;
use crate::hardware::memory::{Memory, MemoryBus, PROGRAM_START};
use std::collections::VecDeque;
use std::io;

/// [`Console`] reading from a fixed input and collecting all output.
pub struct FakeConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    fail_output: bool,
    interrupt_after_polls: Option<usize>,
    polls: usize,
    interrupt_after_checks: Option<usize>,
    checks: usize,
}
impl FakeConsole {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::with_capacity(120),
            fail_output: false,
            interrupt_after_polls: None,
            polls: 0,
            interrupt_after_checks: None,
            checks: 0,
        }
    }
    pub fn with_failing_output(mut self) -> Self {
        self.fail_output = true;
        self
    }
    /// Reports an interrupt once [`Console::poll_key_available`] was called `polls` times.
    pub fn with_interrupt_after_polls(mut self, polls: usize) -> Self {
        self.interrupt_after_polls = Some(polls);
        self
    }
    /// Holds back a CTRL-C until [`Console::check_interrupt`] was called `checks` times,
    /// like a terminal where the key press waits in the event queue.
    pub fn with_interrupt_after_checks(mut self, checks: usize) -> Self {
        self.interrupt_after_checks = Some(checks);
        self
    }
    pub const fn checks(&self) -> usize {
        self.checks
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.output.clone()).unwrap()
    }
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}
impl Console for FakeConsole {
    fn poll_key_available(&mut self) -> bool {
        self.polls += 1;
        !self.input.is_empty()
    }
    fn read_char(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }
    fn write_char(&mut self, c: u8) -> io::Result<()> {
        if self.fail_output {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"));
        }
        self.output.push(c);
        Ok(())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
    fn is_interrupted(&self) -> bool {
        self.interrupt_after_polls
            .is_some_and(|limit| self.polls >= limit)
            || self
                .interrupt_after_checks
                .is_some_and(|limit| self.checks >= limit)
    }
    fn check_interrupt(&mut self) -> bool {
        self.checks += 1;
        self.is_interrupted()
    }
}

/// [`MemoryBus`] without IO counting the reads.
pub struct CountingBus {
    memory: Memory,
    reads: usize,
}
impl CountingBus {
    /// Memory with `program` loaded at [`PROGRAM_START`].
    pub fn with_program(program: &[u16]) -> Self {
        let mut memory = Memory::new();
        memory
            .load_image(PROGRAM_START, program)
            .expect("Error loading program");
        Self { memory, reads: 0 }
    }
    pub const fn reads(&self) -> usize {
        self.reads
    }
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
}
impl MemoryBus for CountingBus {
    fn read(&mut self, address: u16) -> u16 {
        self.reads += 1;
        self.memory[address]
    }
    fn write(&mut self, address: u16, value: u16) {
        self.memory[address] = value;
    }
}

/// Big endian image bytes with `.ORIG` header as produced by an assembler.
pub fn image_bytes(origin: u16, words: &[u16]) -> Vec<u8> {
    std::iter::once(origin)
        .chain(words.iter().copied())
        .flat_map(u16::to_be_bytes)
        .collect()
}
