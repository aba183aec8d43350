//! Finding and decoding every cue sheet and archive under a directory.

use std::path::{Path, PathBuf};

use bon::Builder;
use cri_utf::{read::DEFAULT_MAX_DEPTH, ReadOptions};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    pair::{decode_pairs, group_sources, ArchivePair, SourceFile},
};

/// Options for how a directory is scanned
#[derive(Debug, Clone, Copy, Builder)]
pub struct ScanOptions {
    /// Decode pairs on the rayon thread pool
    #[builder(default = true)]
    pub parallel: bool,

    /// How deep tables nested in cue sheets are decoded
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_table_depth: usize,

    /// Follow symbolic links while walking
    #[builder(default)]
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScanOptions {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::builder().max_depth(self.max_table_depth).build()
    }
}

/// Everything found under a directory
#[derive(Debug)]
pub struct ScanReport {
    pub root: PathBuf,
    /// Sorted by base name
    pub pairs: Vec<ArchivePair>,
    /// Files that matched but could not be read
    pub skipped: Vec<PathBuf>,
}

impl ScanReport {
    pub fn archive_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn total_tracks(&self) -> usize {
        self.pairs.iter().map(ArchivePair::total_tracks).sum()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.pairs.iter().map(ArchivePair::total_duration_secs).sum()
    }
}

/// Read every `.acb` and `.awb` file under `root`, pair them up and decode each pair.
///
/// Files or directories that cannot be read are logged and skipped.
#[instrument(skip_all, fields(root = %root.as_ref().display()), err)]
pub fn scan_directory(root: impl AsRef<Path>, options: &ScanOptions) -> Result<ScanReport> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "unable to walk");
                skipped.extend(error.path().map(Path::to_path_buf));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match SourceFile::load(entry.path()) {
            Ok(Some(file)) => {
                debug!(path = %file.path.display(), size = file.data.len(), "found");
                files.push(file);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(path = %entry.path().display(), %error, "unable to read");
                skipped.push(entry.into_path());
            }
        }
    }

    let mut pairs = decode_pairs(group_sources(files), options);
    pairs.sort_by(|a, b| {
        a.base_name
            .cmp(&b.base_name)
            .then_with(|| a.directory.cmp(&b.directory))
    });

    let report = ScanReport {
        root: root.to_path_buf(),
        pairs,
        skipped,
    };
    info!(
        archives = report.archive_count(),
        tracks = report.total_tracks(),
        "scan complete"
    );

    Ok(report)
}
