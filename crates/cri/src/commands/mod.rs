pub mod awb;
pub mod hca;
pub mod scan;
pub mod utf;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Report every ACB/AWB pair under a directory
    Scan(scan::ScanArgs),
    /// Dump a @UTF table as JSON
    Utf(utf::UtfArgs),
    /// Show the header of an HCA stream
    Hca(hca::HcaArgs),
    /// List the entries of an AWB archive
    Awb(awb::AwbArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Scan(scan) => scan.handle(),
            Commands::Utf(utf) => utf.handle(),
            Commands::Hca(hca) => hca.handle(),
            Commands::Awb(awb) => awb.handle(),
        }
    }
}

/// Read a whole input file, naming it in the error.
pub(crate) fn read_file(path: &std::path::Path) -> miette::Result<Vec<u8>> {
    use miette::{Context, IntoDiagnostic};

    std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}
