use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Create a skeleton libdragon application in the current directory
    #[command(after_long_help = "Examples:\n  libdragon init\n  libdragon init --submodule\n")]
    Init {
        /// Overwrite existing skeleton files
        #[arg(long, short = 'f')]
        force: bool,
        /// Vendor libdragon with git submodule instead of git subtree
        #[arg(long, short = 'm')]
        submodule: bool,
        /// Toolchain image to use from now on (persisted in .git)
        #[arg(long)]
        image: Option<String>,
    },

    /// Start the libdragon container for the current repository
    Start {
        /// Toolchain image for a newly created container (this run only)
        #[arg(long)]
        image: Option<String>,
    },

    /// Remove the libdragon container for the current repository
    Stop,

    /// Run a command using the libdragon toolchain
    #[command(after_long_help = "Examples:\n  libdragon exec makedfs game.dfs assets/\n")]
    Exec {
        /// Command and arguments to run inside the container
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the libdragon build system (shortcut for `exec make`)
    Make {
        /// Additional arguments passed through to make
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Disassemble a N64 binary and show assembly source for symbols
    #[command(after_long_help = "Examples:\n  libdragon disasm dfs_read\n")]
    Disasm {
        /// Symbol to disassemble (default: whole binary)
        symbol: Option<String>,
        /// ELF binary to disassemble (default: autodiscover)
        #[arg(long, short = 'F')]
        file: Option<PathBuf>,
    },

    /// Update libdragon in the current repository, and its toolchain
    Update {
        /// Where libdragon is located (default: autodetect)
        #[arg(long, short = 'd')]
        directory: Option<PathBuf>,
        /// Commit/branch/tag to update libdragon to (default: upstream branch)
        #[arg(long, short = 'r')]
        revision: Option<String>,
        /// Toolchain image to use from now on (persisted in .git)
        #[arg(long)]
        image: Option<String>,
    },

    /// Show the effective toolchain image and where it comes from
    Toolchain,
}

#[derive(Parser, Debug)]
#[command(
    name = "libdragon",
    version,
    about = "libdragon tool - help managing development of Nintendo 64 ROMs using libdragon"
)]
pub(crate) struct Cli {
    /// Be verbose: show every external command before it runs
    #[arg(long, short = 'v', global = true)]
    pub(crate) verbose: bool,

    /// Work in the specified directory
    #[arg(long, short = 'C', global = true)]
    pub(crate) chdir: Option<PathBuf>,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<libdragon::ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Command,
}
