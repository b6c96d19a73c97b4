use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use log::{debug, info};

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error_result};
use crate::model::Config;
use crate::utils::file_utils;

macro_rules! cant_write_result {
    ($path:expr, $err:expr) => {
        create_m3u_curator_error_result!(M3uCuratorErrorKind::Persist, "failed to write m3u playlist: {} - {}", $path.to_string_lossy(), $err)
    }
}

/// Handed through to the sink untouched.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SaveIntent {
    #[default]
    Plain,
    Advanced,
}

impl Display for SaveIntent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Plain => "plain",
            Self::Advanced => "advanced",
        })
    }
}

/// Receives a complete playlist text. Failures are reported, never retried.
pub trait PlaylistSink {
    fn persist(&mut self, content: &str, intent: SaveIntent) -> Result<(), M3uCuratorError>;
}

/// Writes the filtered playlist file, keeping a timestamped copy of the previous one
/// when a backup directory is configured.
#[derive(Debug, Clone)]
pub struct FilePlaylistSink {
    path: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl FilePlaylistSink {
    pub fn new(cfg: &Config) -> Self {
        Self {
            path: cfg.get_filtered_path(),
            backup_dir: cfg.backup_dir.as_ref().map(PathBuf::from),
        }
    }
}

impl PlaylistSink for FilePlaylistSink {
    fn persist(&mut self, content: &str, intent: SaveIntent) -> Result<(), M3uCuratorError> {
        if let Some(backup_dir) = &self.backup_dir {
            match file_utils::backup_file(&self.path, backup_dir) {
                Ok(Some(backup_path)) => debug!("backup of {} written to {}", self.path.to_string_lossy(), backup_path.to_string_lossy()),
                Ok(None) => {}
                Err(err) => return cant_write_result!(backup_dir, err),
            }
        }
        if let Err(err) = file_utils::write_file_atomic(&self.path, content) {
            return cant_write_result!(&self.path, err);
        }
        info!("Saved filtered playlist ({} save) to {}", intent, self.path.to_string_lossy());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::model::Config;
    use crate::repository::m3u_repository::{FilePlaylistSink, PlaylistSink, SaveIntent};

    fn create_config(dir: &std::path::Path, backup: bool) -> Config {
        let mut cfg = Config {
            working_dir: dir.to_string_lossy().to_string(),
            backup_dir: if backup { Some("backup".to_string()) } else { None },
            ..Default::default()
        };
        cfg.prepare().unwrap();
        cfg
    }

    #[test]
    fn test_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FilePlaylistSink::new(&create_config(dir.path(), false));
        sink.persist("#EXTM3U", SaveIntent::Plain).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("filtered.m3u")).unwrap(), "#EXTM3U");
        assert!(!dir.path().join("backup").exists());
    }

    #[test]
    fn test_persist_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("filtered.m3u"), "#EXTM3U\nold").unwrap();
        let mut sink = FilePlaylistSink::new(&create_config(dir.path(), true));
        sink.persist("#EXTM3U\nnew", SaveIntent::Advanced).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("filtered.m3u")).unwrap(), "#EXTM3U\nnew");
        let backups: Vec<_> = fs::read_dir(dir.path().join("backup")).unwrap().collect();
        assert_eq!(backups.len(), 1);
        let backup = backups.into_iter().next().unwrap().unwrap().path();
        assert_eq!(fs::read_to_string(backup).unwrap(), "#EXTM3U\nold");
    }
}
