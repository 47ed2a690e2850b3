//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Uploads every file dropped into a folder to an HTTP endpoint, deleting
/// each one once the upload is confirmed
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file path (default: ~/picservice.conf)
    pub config: Option<PathBuf>,
}
