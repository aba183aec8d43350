use clap::Args;
use cri_hca::HcaHeader;
use miette::Result;
use std::path::PathBuf;

use super::read_file;
use crate::report;

#[derive(Args)]
pub struct HcaArgs {
    /// An input HCA stream
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl HcaArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        report::header(&HcaHeader::decode(&data));

        Ok(())
    }
}
