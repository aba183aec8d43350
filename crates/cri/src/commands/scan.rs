use clap::Args;
use cri_acb::{scan_directory, ScanOptions};
use miette::Result;
use std::path::PathBuf;

use crate::report;

#[derive(Args)]
pub struct ScanArgs {
    /// A directory containing .acb and .awb files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Show every track and cue name
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Decode one archive at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

impl ScanArgs {
    pub fn handle(&self) -> Result<()> {
        let options = ScanOptions::builder().parallel(!self.sequential).build();

        let shown = std::fs::canonicalize(&self.directory).unwrap_or_else(|_| self.directory.clone());
        println!("Scanning: {}", shown.display());

        let report = scan_directory(&self.directory, &options)?;
        if report.pairs.is_empty() {
            println!("No ACB/AWB files found.");
            return Ok(());
        }

        for pair in &report.pairs {
            report::pair(pair, self.verbose);
        }
        report::summary(&report);

        Ok(())
    }
}
