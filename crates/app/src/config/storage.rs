//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where the guest cart and session live.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the guest cart and session
    #[arg(long, env = "ROUGE_STORAGE_DIR", default_value = ".rouge", global = true)]
    pub storage_dir: PathBuf,
}
