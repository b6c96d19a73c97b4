use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use log::debug;

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error_result};
use crate::model::Config;
use crate::utils::file_utils;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SourceKind {
    UnfilteredPlaylist,
    FilteredPlaylist,
    GuideDocument,
}

impl SourceKind {
    const UNFILTERED_PLAYLIST: &'static str = "unfiltered playlist";
    const FILTERED_PLAYLIST: &'static str = "filtered playlist";
    const GUIDE_DOCUMENT: &'static str = "guide document";
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::UnfilteredPlaylist => Self::UNFILTERED_PLAYLIST,
            Self::FilteredPlaylist => Self::FILTERED_PLAYLIST,
            Self::GuideDocument => Self::GUIDE_DOCUMENT,
        })
    }
}

/// Supplies the raw text of a source, `Ok(None)` when the source does not exist.
pub trait TextSource {
    fn fetch(&self, kind: SourceKind) -> Result<Option<String>, M3uCuratorError>;
}

/// Reads the sources from the files configured in `sources`.
#[derive(Debug, Clone)]
pub struct FileTextSource {
    unfiltered: PathBuf,
    filtered: PathBuf,
    guide: PathBuf,
}

impl FileTextSource {
    pub fn new(cfg: &Config) -> Self {
        Self {
            unfiltered: cfg.get_unfiltered_path(),
            filtered: cfg.get_filtered_path(),
            guide: cfg.get_guide_path(),
        }
    }

    pub fn get_path(&self, kind: SourceKind) -> &PathBuf {
        match kind {
            SourceKind::UnfilteredPlaylist => &self.unfiltered,
            SourceKind::FilteredPlaylist => &self.filtered,
            SourceKind::GuideDocument => &self.guide,
        }
    }
}

impl TextSource for FileTextSource {
    fn fetch(&self, kind: SourceKind) -> Result<Option<String>, M3uCuratorError> {
        let path = self.get_path(kind);
        debug!("reading {} from {}", kind, path.to_string_lossy());
        match file_utils::read_optional_text_file(path) {
            Ok(content) => Ok(content),
            Err(err) => create_m3u_curator_error_result!(M3uCuratorErrorKind::Info, "cant read {} {}: {}", kind, path.to_string_lossy(), err),
        }
    }
}
