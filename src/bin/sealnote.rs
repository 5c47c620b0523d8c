//! Sealnote CLI - Password-based encryption of text secrets
//!
//! Command-line interface for producing and opening sealnote envelopes
//! (AES-256-GCM with PBKDF2-HMAC-SHA256 key derivation).

use clap::{Parser, Subcommand};
use std::error::Error as _;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use sealnote::SealnoteError;
use sealnote::file_ops;
use sealnote::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "SEALNOTE_LOG";

#[derive(Parser)]
#[command(name = "sealnote")]
#[command(version)]
#[command(about = "Password-based encryption of text secrets.", long_about = None)]
struct Cli {
    /// Read password from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a text file into an envelope
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the envelope to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt an envelope file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file containing the envelope
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Replace the secret in an envelope file, while validating
    /// that the password is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing envelope file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut reader = get_passphrase_reader(cli.passphrase_stdin);
    let result = match cli.command {
        Commands::Encrypt { input, output } => file_ops::encrypt_file(&input, &output, &mut *reader),
        Commands::Decrypt { input, output } => file_ops::decrypt_file(&input, &output, &mut *reader),
        Commands::Update { input, output } => file_ops::update_file(&input, &output, &mut *reader),
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind, category = ?e.category, "command failed: {}", full_chain(&e));
        eprintln!("Error: {}", render(&e));
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}

/// Failed decryptions all print the same message; anything else prints
/// its full cause chain.
fn render(err: &SealnoteError) -> String {
    if err.is_decrypt_failure() {
        err.user_message().to_string()
    } else {
        full_chain(err)
    }
}

fn full_chain(err: &SealnoteError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
