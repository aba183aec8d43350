//! Grouping `.acb` and `.awb` files that belong together, and decoding each group.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use cri_afs2::Afs2Archive;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::{
    catalog::CueCatalog,
    error::Result,
    scan::ScanOptions,
};

/// What a file contributes to a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// `.acb` cue sheet
    Catalog,
    /// `.awb` archive
    Archive,
}

impl FileRole {
    /// Classify a file by its extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Option<FileRole> {
        let extension = path.as_ref().extension().and_then(OsStr::to_str)?;
        match extension.to_ascii_lowercase().as_str() {
            "acb" => Some(FileRole::Catalog),
            "awb" => Some(FileRole::Archive),
            _ => None,
        }
    }
}

/// A file read into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub role: FileRole,
    pub data: Vec<u8>,
}

impl SourceFile {
    /// Read a file whose extension gives it a role, `None` for any other file.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<SourceFile>> {
        let path = path.as_ref();
        let Some(role) = FileRole::from_path(path) else {
            return Ok(None);
        };

        Ok(Some(SourceFile {
            path: path.to_path_buf(),
            role,
            data: fs::read(path)?,
        }))
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Files sharing a directory and a base name
#[derive(Debug, Clone, Default)]
pub struct SourceGroup {
    pub directory: PathBuf,
    pub base_name: String,
    pub catalog: Option<SourceFile>,
    pub archive: Option<SourceFile>,
}

/// Group files by directory and base name, compared without case.
///
/// Groups keep the order their first file was seen in.
pub fn group_sources(files: impl IntoIterator<Item = SourceFile>) -> Vec<SourceGroup> {
    let mut groups: IndexMap<(PathBuf, String), SourceGroup> = IndexMap::new();

    for file in files {
        let directory = file.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let base_name = file.stem();
        let group = groups
            .entry((directory.clone(), base_name.to_lowercase()))
            .or_insert_with(|| SourceGroup {
                directory,
                base_name,
                ..Default::default()
            });

        let slot = match file.role {
            FileRole::Catalog => &mut group.catalog,
            FileRole::Archive => &mut group.archive,
        };
        if let Some(previous) = slot.replace(file) {
            warn!(path = %previous.path.display(), "duplicate file in group, ignoring");
        }
    }

    groups.into_values().collect()
}

/// A decoded file of a pair, or why it could not be decoded
#[derive(Debug)]
pub struct Member<T> {
    pub path: PathBuf,
    pub decoded: Result<T>,
}

impl<T> Member<T> {
    pub fn ok(&self) -> Option<&T> {
        self.decoded.as_ref().ok()
    }
}

/// A cue sheet and its archive, either of which may be missing
#[derive(Debug)]
pub struct ArchivePair {
    pub directory: PathBuf,
    pub base_name: String,
    pub catalog: Option<Member<CueCatalog>>,
    pub archive: Option<Member<Afs2Archive>>,
}

impl ArchivePair {
    /// Decode both sides of a group.
    #[instrument(skip_all, fields(base_name = %group.base_name), level = "debug")]
    pub fn decode(group: SourceGroup, options: &ScanOptions) -> ArchivePair {
        let read_options = options.read_options();

        let catalog = group.catalog.map(|file| Member {
            decoded: CueCatalog::decode(&file.data, read_options),
            path: file.path,
        });
        let archive = group.archive.map(|file| Member {
            decoded: Afs2Archive::from_shared(file.data.into()).map_err(Into::into),
            path: file.path,
        });

        if let Some(Member {
            path,
            decoded: Err(error),
        }) = &catalog
        {
            warn!(path = %path.display(), %error, "unable to decode cue sheet");
        }
        if let Some(Member {
            path,
            decoded: Err(error),
        }) = &archive
        {
            warn!(path = %path.display(), %error, "unable to decode archive");
        }

        ArchivePair {
            directory: group.directory,
            base_name: group.base_name,
            catalog,
            archive,
        }
    }

    /// Whether both the cue sheet and the archive are present
    pub fn is_complete(&self) -> bool {
        self.catalog.is_some() && self.archive.is_some()
    }

    /// Number of entries in the archive, valid or not
    pub fn total_tracks(&self) -> usize {
        self.archive
            .as_ref()
            .and_then(Member::ok)
            .map_or(0, Afs2Archive::len)
    }

    /// Summed duration of the valid archive entries
    pub fn total_duration_secs(&self) -> f64 {
        self.archive
            .as_ref()
            .and_then(Member::ok)
            .map_or(0.0, Afs2Archive::duration_secs)
    }
}

/// Decode every group, in parallel unless the options say otherwise.
pub fn decode_pairs(groups: Vec<SourceGroup>, options: &ScanOptions) -> Vec<ArchivePair> {
    if options.parallel {
        groups
            .into_par_iter()
            .map(|group| ArchivePair::decode(group, options))
            .collect()
    } else {
        groups
            .into_iter()
            .map(|group| ArchivePair::decode(group, options))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use crate::pair::{group_sources, FileRole, SourceFile};

    fn file(path: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            role: FileRole::from_path(path).unwrap(),
            data: Vec::new(),
        }
    }

    #[test]
    fn roles() {
        assert_eq!(FileRole::from_path("a/bgm.acb"), Some(FileRole::Catalog));
        assert_eq!(FileRole::from_path("a/BGM.AWB"), Some(FileRole::Archive));
        assert_eq!(FileRole::from_path("a/bgm.acf"), None);
        assert_eq!(FileRole::from_path("a/acb"), None);
    }

    #[test]
    fn groups_by_directory_and_stem() {
        let groups = group_sources([
            file("voice/vo_001.acb"),
            file("bgm/title.awb"),
            file("voice/VO_001.awb"),
            file("bgm/title.acb"),
            file("voice/vo_002.acb"),
            file("other/title.awb"),
        ]);

        let summary = groups
            .iter()
            .map(|g| {
                (
                    g.directory.to_string_lossy().into_owned(),
                    g.base_name.as_str(),
                    g.catalog.is_some(),
                    g.archive.is_some(),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![
                ("voice".to_string(), "vo_001", true, true),
                ("bgm".to_string(), "title", true, true),
                ("voice".to_string(), "vo_002", true, false),
                ("other".to_string(), "title", false, true),
            ]
        );
    }
}
