use clap::Args;
use cri_utf::{ReadOptions, Table};
use miette::{miette, IntoDiagnostic, Result};
use std::path::PathBuf;

use super::read_file;

#[derive(Args)]
pub struct UtfArgs {
    /// An input file starting with a @UTF table (.acb, .acf, ...)
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Indent the output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// How deep nested tables are decoded
    #[arg(long, value_name = "DEPTH", default_value_t = cri_utf::read::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl UtfArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_file(&self.file)?;
        let options = ReadOptions::builder().max_depth(self.max_depth).build();

        let table = Table::decode_at(&data, 0, options)?
            .ok_or_else(|| miette!("{} is not a @UTF table", self.file.display()))?;

        let json = if self.pretty {
            serde_json::to_string_pretty(&table)
        } else {
            serde_json::to_string(&table)
        }
        .into_diagnostic()?;
        println!("{json}");

        Ok(())
    }
}
