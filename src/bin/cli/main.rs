//! Command-line interface for VARC archives.

mod commands;
mod exit_codes;
mod password;
mod progress;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Secure single-file archive tool
#[derive(Parser)]
#[command(name = "varc")]
#[command(author, about = "VARC secure archive tool", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print version information
    #[arg(short = 'v', long = "version")]
    show_version: bool,

    /// Password for encryption or decryption
    #[arg(short = 'p', long, global = true)]
    password: Option<String>,

    /// Enable encryption for added files
    #[arg(short = 'e', long, global = true)]
    encrypt: bool,

    /// Disable compression
    #[arg(long = "no-compress", global = true)]
    no_compress: bool,

    /// Compression level (0 = none, 1-3 = fast, 6 = default, 9 = best)
    #[arg(long = "compress-level", value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = 6, global = true)]
    compress_level: u32,

    /// Overwrite existing files during extraction
    #[arg(short = 'o', long, global = true)]
    overwrite: bool,

    /// Suppress progress output
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Raw output: exact byte counts, no timestamps
    #[arg(long, global = true)]
    raw: bool,

    /// Show entry checksums when listing
    #[arg(long, global = true)]
    checksums: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new archive from files and directories
    #[command(aliases = ["c", "pack"])]
    Create {
        /// Path of the archive to create
        archive: PathBuf,
        /// Files and directories to add
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Extract files from an archive
    #[command(aliases = ["x", "unpack"])]
    Extract {
        /// Archive to extract
        archive: PathBuf,
        /// Output directory (defaults to the current directory)
        output_dir: Option<PathBuf>,
    },

    /// List archive contents
    #[command(alias = "l")]
    List {
        /// Archive to list
        archive: PathBuf,
    },

    /// Verify archive integrity
    #[command(alias = "v")]
    Verify {
        /// Archive to verify
        archive: PathBuf,
    },

    /// Add files to an existing archive
    #[command(alias = "a")]
    Add {
        /// Archive to modify
        archive: PathBuf,
        /// Files and directories to add
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Remove entries matching wildcard patterns
    #[command(alias = "rm")]
    Remove {
        /// Archive to modify
        archive: PathBuf,
        /// Patterns of entries to remove (`*` and `?` wildcards)
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Encrypt an archive with a password
    Lock {
        /// Archive to lock
        archive: PathBuf,
    },

    /// Decrypt an archive
    Unlock {
        /// Archive to unlock
        archive: PathBuf,
    },

    /// Show version information
    Version,
}

/// Options shared by every command.
pub struct GlobalOpts {
    pub password: Option<String>,
    pub encrypt: bool,
    pub compress: bool,
    pub level: u32,
    pub overwrite: bool,
    pub quiet: bool,
    pub raw: bool,
    pub checksums: bool,
}

fn print_version() {
    println!("VaultArchive (varc) {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Features:");
    println!("  - AES-256-CBC encryption (PBKDF2-HMAC-SHA-256 key derivation)");
    println!("  - DEFLATE compression");
    println!("  - SHA-256 integrity verification");
}

fn main() {
    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted");
        std::process::exit(130);
    })
    .ok();

    let cli = Cli::parse();

    if cli.show_version {
        print_version();
        std::process::exit(exit_codes::SUCCESS);
    }

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(exit_codes::SUCCESS);
    };

    let opts = GlobalOpts {
        password: cli.password,
        encrypt: cli.encrypt,
        compress: !cli.no_compress,
        level: cli.compress_level,
        overwrite: cli.overwrite,
        quiet: cli.quiet,
        raw: cli.raw,
        checksums: cli.checksums,
    };

    let code = match command {
        Commands::Create { archive, inputs } => commands::create(&archive, &inputs, &opts),
        Commands::Extract {
            archive,
            output_dir,
        } => commands::extract(&archive, output_dir.as_deref(), &opts),
        Commands::List { archive } => commands::list(&archive, &opts),
        Commands::Verify { archive } => commands::verify(&archive, &opts),
        Commands::Add { archive, inputs } => commands::add(&archive, &inputs, &opts),
        Commands::Remove { archive, patterns } => commands::remove(&archive, &patterns, &opts),
        Commands::Lock { archive } => commands::lock(&archive, &opts),
        Commands::Unlock { archive } => commands::unlock(&archive, &opts),
        Commands::Version => {
            print_version();
            exit_codes::SUCCESS
        }
    };

    std::process::exit(code);
}
