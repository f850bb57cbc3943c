use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/remove-password";

/// Remove passwords from PDF files
#[derive(Parser, Debug)]
#[command(name = "pdfunlock")]
#[command(about = "Unlock password-protected PDFs through a decryption endpoint")]
pub struct Cli {
    /// PDF files to unlock
    pub files: Vec<PathBuf>,

    /// Password used for every file
    #[arg(long, env = "PDFUNLOCK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Ask for a password for each file (wins over --password)
    #[arg(long)]
    pub per_file: bool,

    /// URL of the decryption endpoint
    #[arg(long, env = "PDFUNLOCK_ENDPOINT", default_value = DEFAULT_ENDPOINT, conflicts_with = "local")]
    pub endpoint: String,

    /// Unlock in this process instead of calling an endpoint
    #[arg(long)]
    pub local: bool,

    /// Where unlocked files are written
    #[arg(short, long, env = "PDFUNLOCK_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Bundle unlocked files into unlocked_pdfs.zip instead of separate files
    #[arg(long)]
    pub zip: bool,

    /// Number of files processed at the same time
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Per-request timeout in seconds
    #[arg(long, env = "PDFUNLOCK_TIMEOUT_SECS", default_value_t = pdfunlock_batch::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
