//! Commodore 64 emulator binary.
//!
//! Loads the three ROMs, runs the processor against a paced clock and
//! prints the registers (and optionally a memory range) when it stops.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use emu_c64::{C64, C64Config, C64Error, C64Model, RomSet, RunOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    Pal,
    Ntsc,
}

impl From<Model> for C64Model {
    fn from(model: Model) -> Self {
        match model {
            Model::Pal => C64Model::Pal,
            Model::Ntsc => C64Model::Ntsc,
        }
    }
}

/// A `[start, end)` address range.
#[derive(Debug, Clone, Copy)]
struct DumpRange {
    start: u16,
    end: u32,
}

fn parse_hex(text: &str) -> Result<u32, String> {
    let digits = text
        .trim_start_matches("0x")
        .trim_start_matches('$');
    u32::from_str_radix(digits, 16).map_err(|e| format!("{text}: {e}"))
}

/// Parse `START:END` in hex, e.g. `0400:0800` or `$E000:$10000`.
fn parse_range(text: &str) -> Result<DumpRange, String> {
    let (start, end) = text
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {text}"))?;
    let start = parse_hex(start)?;
    let end = parse_hex(end)?;
    let start = u16::try_from(start).map_err(|_| format!("start ${start:X} is above $FFFF"))?;
    if end > 0x1_0000 {
        return Err(format!("end ${end:X} is above $10000"));
    }
    Ok(DumpRange { start, end })
}

#[derive(Parser)]
#[command(name = "emu-c64", version, about = "Cycle-accurate C64 processor and memory map")]
struct Args {
    /// BASIC ROM image (8192 bytes)
    #[arg(long, value_name = "FILE")]
    basic_rom: PathBuf,

    /// KERNAL ROM image (8192 bytes)
    #[arg(long, value_name = "FILE")]
    kernal_rom: PathBuf,

    /// Character ROM image (4096 bytes)
    #[arg(long, value_name = "FILE")]
    character_rom: PathBuf,

    /// Machine model, which sets the clock rate
    #[arg(long, value_enum, default_value_t = Model::Pal)]
    model: Model,

    /// Stop after this many cycles [default: run until stopped]
    #[arg(long)]
    cycles: Option<u64>,

    /// Run flat out instead of at the model's clock rate
    #[arg(long)]
    unpaced: bool,

    /// Print a memory dump of START:END (hex) after the run
    #[arg(long, value_name = "START:END", value_parser = parse_range)]
    dump: Option<DumpRange>,

    /// Log every bus access at trace level (target "bus")
    #[arg(long)]
    trace: bool,
}

fn run(args: &Args) -> Result<(), C64Error> {
    let roms = RomSet::load(&args.basic_rom, &args.kernal_rom, &args.character_rom)?;
    let mut c64 = C64::new(C64Config {
        model: args.model.into(),
        roms,
    });

    if args.trace {
        c64.set_trace(|event| {
            log::trace!(
                target: "bus",
                "{:>10} {:?} ${:04X} = ${:02X}",
                event.cycle,
                event.kind,
                event.address,
                event.value
            );
        });
    }

    let summary = c64.run(RunOptions {
        cycles: args.cycles,
        paced: !args.unpaced,
    })?;
    log::info!("{} cycles in {:.3?}", summary.cycles, summary.elapsed);

    print!("{}", c64.registers());
    if let Some(range) = args.dump {
        print!("{}", c64.dump(range.start, range.end));
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
