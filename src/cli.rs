use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gopkg-finder")]
#[command(about = "List importable Go packages under configured source roots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Explicit source roots; overrides GOROOT/GOPATH discovery
    #[arg(long = "src-dir", value_name = "DIR")]
    pub src_dirs: Vec<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub goroot: Option<PathBuf>,

    /// GOPATH-style list of workspace directories
    #[arg(long, value_name = "LIST")]
    pub gopath: Option<OsString>,

    /// Walker threads; 0 picks automatically
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Scan the source roots and print the package catalog
    List {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Keep only packages whose import path starts with this prefix
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the resolved source roots in scan order
    Roots,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
