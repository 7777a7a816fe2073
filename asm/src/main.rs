use std::{
    ffi::OsString,
    fs::File,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use asm80::{
    fileman::{FileManager, RealFileSystem},
    Assembler,
};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to input assembly file (Default: stdin)
    #[clap(parse(from_os_str), value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to output binary file (Default: FILE with a .com extension, or stdout)
    #[clap(parse(from_os_str), short, long)]
    output: Option<PathBuf>,

    /// Also write the symbol table next to the output file
    #[clap(short, long)]
    symtab: bool,

    /// Report what was assembled
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

fn open_output(path: &Path) -> Result<File, ExitCode> {
    File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| {
            eprintln!("Cannot open file \"{}\" for writing: {e}", path.display());
            ExitCode::FAILURE
        })
}

fn run(args: Args) -> Result<(), ExitCode> {
    let cwd = std::env::current_dir().map_err(|e| {
        eprintln!("Cannot read the current directory: {e}");
        ExitCode::FAILURE
    })?;

    let (source, lines) = match &args.file {
        Some(path) if path != Path::new("-") => {
            let file_manager = FileManager::new(RealFileSystem::new());
            match file_manager.read_lines(&cwd, path) {
                Ok(Some((path, lines))) => (Some(path), lines),
                Ok(None) => {
                    eprintln!("File not found: \"{}\"", path.display());
                    return Err(ExitCode::FAILURE);
                }
                Err(e) => {
                    eprintln!("Failed to open \"{}\" for reading: {e}", path.display());
                    return Err(ExitCode::FAILURE);
                }
            }
        }
        _ => match io::stdin().lock().lines().collect::<io::Result<Vec<_>>>() {
            Ok(lines) => (None, lines),
            Err(e) => {
                eprintln!("Failed to read standard input: {e}");
                return Err(ExitCode::FAILURE);
            }
        },
    };
    debug!(lines = lines.len(), "read source");

    let module = Assembler::new().assemble(&lines).map_err(|e| {
        if let Some(path) = &source {
            eprintln!("In \"{}\"", path.display());
        }
        eprintln!("{e}");
        ExitCode::FAILURE
    })?;

    let output_path = args.output.clone().or_else(|| {
        let stem = source.as_ref()?.file_stem()?;
        let mut name = OsString::from(stem);
        name.push(".com");
        Some(cwd.join(name))
    });

    let mut output: Box<dyn Write> = match &output_path {
        Some(path) => Box::new(open_output(path)?),
        None => Box::new(io::stdout()),
    };
    if let Err(e) = module.write(&mut output).and_then(|_| output.flush()) {
        eprintln!("Failed to write output: {e}");
        return Err(ExitCode::FAILURE);
    }

    if args.symtab && !module.symtab().is_empty() {
        match &output_path {
            Some(path) => {
                let path = path.with_extension("sym");
                let mut file = open_output(&path)?;
                if let Err(e) = module.write_symbols(&mut file) {
                    eprintln!("Failed to write \"{}\": {e}", path.display());
                    return Err(ExitCode::FAILURE);
                }
                debug!("symbols written to {}", path.display());
            }
            None => warn!("no symbol file is written when the output goes to stdout"),
        }
    }

    if args.verbose {
        eprintln!("{} bytes written", module.data().len());
        eprintln!("{} symbols", module.symtab().len());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
