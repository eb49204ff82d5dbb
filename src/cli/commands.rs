use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vtodo", about = concat!("vtodo v", env!("CARGO_PKG_VERSION"), " - read, check and rewrite iCalendar todos"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file with TZID offsets and the error policy
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every todo in a calendar, ordered by due date
    Show(FileArgs),
    /// Rewrite every todo in canonical property order
    Normalize(NormalizeArgs),
    /// Report todos that can't be read
    Check(FileArgs),
    /// List pairs of todos whose time windows intersect
    Overlaps(FileArgs),
}

#[derive(Args)]
pub struct FileArgs {
    /// Calendar file (.ics)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Calendar file (.ics)
    pub file: PathBuf,
    /// Write to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}
