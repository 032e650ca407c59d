use googletest::prelude::*;
use lc3_vm::emulator;
use lc3_vm::emulator::RunState;
use lc3_vm::errors::{ExecutionError, LoadProgramError};
use lc3_vm::hardware::console::Console;
use lc3_vm::hardware::registers::{ConditionFlag, from_decimal};
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

struct ScriptedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}
impl ScriptedConsole {
    fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
impl Console for ScriptedConsole {
    fn poll_key_available(&mut self) -> bool {
        !self.input.is_empty()
    }
    fn read_char(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }
    fn write_char(&mut self, c: u8) -> io::Result<()> {
        self.output.push(c);
        Ok(())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
    fn is_interrupted(&self) -> bool {
        false
    }
}

fn write_image(name: &str, origin: u16, words: &[u16]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lc3-vm-{}-{name}.obj", std::process::id()));
    let bytes: Vec<u8> = std::iter::once(origin)
        .chain(words.iter().copied())
        .flat_map(u16::to_be_bytes)
        .collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

#[gtest]
fn test_and_add_halt_from_file() {
    // AND R0,R0,#0; ADD R0,R0,#5; TRAP x25
    let path = write_image("add", 0x3000, &[0x5020, 0x1025, 0xF025]);
    let mut emu = emulator::from_program(&path).unwrap();
    let mut console = ScriptedConsole::new(b"");
    let res = emu.execute(&mut console);
    std::fs::remove_file(&path).unwrap();
    assert_that!(res, ok(eq(&())));
    expect_that!(emu.registers().get(0), eq(from_decimal(5)));
    expect_that!(emu.registers().get_conditional_register(), eq(ConditionFlag::Pos));
    expect_that!(emu.run_state(), eq(RunState::Halted));
}

#[gtest]
fn test_two_images_with_subroutine_in_second() {
    // main at x3000: LD R1, PTR; JSRR R1; TRAP x25; PTR .FILL x4000
    let main = write_image("main", 0x3000, &[0x2202, 0x4040, 0xF025, 0x4000]);
    // x4000: LEA R0, MSG; PUTS; RET; MSG .STRINGZ "ok"
    let lib = write_image(
        "lib",
        0x4000,
        &[0xE002, 0xF022, 0xC1C0, u16::from(b'o'), u16::from(b'k'), 0],
    );
    let res = emulator::from_programs(&[&main, &lib]);
    std::fs::remove_file(&main).unwrap();
    std::fs::remove_file(&lib).unwrap();
    let mut emu = res.unwrap();
    let mut console = ScriptedConsole::new(b"");
    assert_that!(emu.execute(&mut console), ok(eq(&())));
    expect_that!(console.output(), eq("okHALT\n"));
}

#[gtest]
fn test_in_echoes_and_halts() {
    // IN; OUT; HALT
    let mut emu = emulator::from_program_bytes(&[0x30, 0x00, 0xF0, 0x23, 0xF0, 0x21, 0xF0, 0x25])
        .unwrap();
    let mut console = ScriptedConsole::new(b"z");
    assert_that!(emu.execute(&mut console), ok(eq(&())));
    expect_that!(console.output(), eq("Enter a character: zzHALT\n"));
}

#[gtest]
fn test_unknown_trap_is_fatal() {
    let mut emu = emulator::from_program_bytes(&[0x30, 0x00, 0xF0, 0xFF, 0xF0, 0x25]).unwrap();
    let mut console = ScriptedConsole::new(b"");
    assert_that!(
        emu.execute(&mut console),
        err(eq(&ExecutionError::UnknownTrapVector {
            vector: 0xFF,
            address: 0x3000
        }))
    );
    expect_that!(console.output(), eq(""));
}

#[gtest]
fn test_missing_image() {
    let err = emulator::from_programs(&["no/such/image.obj"]).unwrap_err();
    assert!(
        matches!(err, LoadProgramError::ProgramLoadError { ref path, .. } if path == "no/such/image.obj"),
        "{err:?}"
    );
}
