use std::{
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use dis80::opcodes;
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the binary image to decode
    #[clap(parse(from_os_str), value_name = "FILE")]
    file: PathBuf,

    /// Report what was decoded
    #[clap(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn read_image(args: &Args) -> io::Result<Vec<u8>> {
    let mut file = File::open(&args.file)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let data = match read_image(&args) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read \"{}\": {e}", args.file.display());
            return ExitCode::FAILURE;
        }
    };
    debug!(bytes = data.len(), "read image");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut decoded = 0;
    let mut undocumented = 0;
    for instruction in dis80::disassemble(&data) {
        decoded += instruction.size();
        if opcodes::is_undocumented(instruction.opcode()) {
            undocumented += 1;
        }
        if let Err(e) = writeln!(out, "{instruction}") {
            eprintln!("Failed to write output: {e}");
            return ExitCode::FAILURE;
        }
    }

    if undocumented > 0 {
        debug!("{undocumented} undocumented opcodes");
    }
    if decoded < data.len() {
        debug!("{} trailing bytes not decoded", data.len() - decoded);
    }
    ExitCode::SUCCESS
}
