use clap::Parser;
use lc3_vm::emulator;
use lc3_vm::emulator::dump::MemoryDump;
use lc3_vm::errors::ExecutionError;
use lc3_vm::hardware::console::TerminalConsole;
use lc3_vm::terminal::ConsoleSession;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

/// LC-3 virtual machine
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Program images to load, in order
    #[arg(required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Write a memory dump into this directory when an unknown trap vector is executed
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let mut emu = emulator::Emulator::new();
    for image in &args.images {
        if let Err(e) = emu.load_program_file(image) {
            eprintln!("failed to load image: {}: {e}", image.display());
            return ExitCode::from(EXIT_FAILURE);
        }
    }
    if let Some(dir) = args.dump_dir {
        emu.set_unknown_trap_observer(Box::new(MemoryDump::new(dir)));
    }

    let res = {
        let _session = ConsoleSession::acquire();
        let mut console = TerminalConsole::new();
        emu.execute(&mut console)
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(ExecutionError::Interrupted) => {
            eprintln!();
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
