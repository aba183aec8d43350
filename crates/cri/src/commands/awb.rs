use clap::Args;
use cri_afs2::Afs2Archive;
use miette::Result;
use std::path::PathBuf;

use super::read_file;
use crate::report;

#[derive(Args)]
pub struct AwbArgs {
    /// An input AWB archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl AwbArgs {
    pub fn handle(&self) -> Result<()> {
        let archive = Afs2Archive::from_shared(read_file(&self.file)?.into())?;
        report::archive(&archive, true);

        Ok(())
    }
}
