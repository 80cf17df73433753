//! Replays a stored command log onto a fresh grid and prints the result.
//!
//! # Usage
//!
//! ```sh
//! crossgrid-inspect puzzle.log --width 15 --height 15 --type american
//! ```
//!
//! List every record with its position relative to the undo cursor:
//!
//! ```sh
//! crossgrid-inspect puzzle.log --records
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use crossgrid_command::{Command, CommandStack, LogError};
use crossgrid_core::{CrosswordType, CrosswordTypeInfo, Size};
use crossgrid_grid::{Grid, GridError};
use log::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    American,
    Swedish,
    Free,
}

impl From<TypeArg> for CrosswordType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::American => Self::American,
            TypeArg::Swedish => Self::Swedish,
            TypeArg::Free => Self::Free,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Command log to replay.
    #[arg(value_name = "LOG_FILE")]
    log_file: PathBuf,

    /// Width of the grid the log was recorded on.
    #[arg(long, value_name = "COLUMNS", default_value_t = 15)]
    width: u16,

    /// Height of the grid the log was recorded on.
    #[arg(long, value_name = "ROWS", default_value_t = 15)]
    height: u16,

    /// Crossword type the grid started with.
    #[arg(long = "type", value_name = "TYPE", default_value = "free")]
    crossword_type: TypeArg,

    /// Print every record of the log.
    #[arg(long)]
    records: bool,

    /// Log replay progress at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
enum InspectError {
    #[display("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("cannot create the grid: {_0}")]
    Grid(#[from] GridError),
    #[display("cannot replay the log: {_0}")]
    Log(#[from] LogError),
}

fn main() -> ExitCode {
    better_panic::install();
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_log(path: &Path) -> Result<Vec<u8>, InspectError> {
    fs::read(path).map_err(|source| InspectError::Read {
        path: path.to_owned(),
        source,
    })
}

fn run(args: &Args) -> Result<(), InspectError> {
    let data = read_log(&args.log_file)?;
    info!(
        "replaying {} bytes from {}",
        data.len(),
        args.log_file.display()
    );

    let info = CrosswordTypeInfo::preset(args.crossword_type.into());
    let mut grid = Grid::new(Size::new(args.width, args.height), info)?;
    let stack = CommandStack::create_from_data(&mut grid, &data)?;

    if args.records {
        for (index, command) in stack.commands().iter().enumerate() {
            let marker = if index < stack.cursor() { '*' } else { ' ' };
            println!("{marker} {index:>5} {}", describe(command));
            for child in command.children() {
                println!("        - {}", describe(child));
            }
        }
        println!();
    }

    println!(
        "{} commands, cursor {} ({} bytes)",
        stack.len(),
        stack.cursor(),
        stack.data().len()
    );
    if let Some(text) = stack.undo_text() {
        println!("undo: {text}");
    }
    if let Some(text) = stack.redo_text() {
        println!("redo: {text}");
    }
    println!();
    print!("{}", grid.content_string());

    let word = grid.solution_word();
    if !word.is_empty() {
        println!("solution word: {word}");
    }
    if grid.type_info().rotational_symmetry && !grid.is_symmetric() {
        println!("warning: the grid is not rotationally symmetric");
    }
    Ok(())
}

fn describe(command: &Command) -> String {
    let text = command.text();
    let kind = command.kind();
    if text == kind.to_string() {
        format!("[{}] {text}", kind.tag())
    } else {
        format!("[{}] {text} ({kind})", kind.tag())
    }
}
