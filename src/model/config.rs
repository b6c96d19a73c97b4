use std::fmt::Display;
use std::path::PathBuf;

use path_clean::PathClean;

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error_result};
use crate::model::LogConfig;
use crate::utils::file_utils;

const DEFAULT_WORKING_DIR: &str = "./data";
const DEFAULT_UNFILTERED_FILE: &str = "unfiltered.m3u";
const DEFAULT_FILTERED_FILE: &str = "filtered.m3u";
const DEFAULT_GUIDE_FILE: &str = "unfiltered.xml";
const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;

fn default_working_dir() -> String { String::from(DEFAULT_WORKING_DIR) }
fn default_unfiltered_file() -> String { String::from(DEFAULT_UNFILTERED_FILE) }
fn default_filtered_file() -> String { String::from(DEFAULT_FILTERED_FILE) }
fn default_guide_file() -> String { String::from(DEFAULT_GUIDE_FILE) }
fn default_match_threshold() -> f64 { DEFAULT_MATCH_THRESHOLD }

#[derive(Debug, Copy, Clone, serde::Serialize, serde::Deserialize, Eq, PartialEq, Default)]
pub enum GuideMatchStrategy {
    #[serde(rename = "exact")]
    #[default]
    Exact,
    #[serde(rename = "fuzzy")]
    Fuzzy,
}

impl GuideMatchStrategy {
    const EXACT: &'static str = "exact";
    const FUZZY: &'static str = "fuzzy";
}

impl Display for GuideMatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", match *self {
            Self::Exact => Self::EXACT,
            Self::Fuzzy => Self::FUZZY,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigGuideMatch {
    #[serde(default)]
    pub strategy: GuideMatchStrategy,
    #[serde(default = "default_match_threshold")]
    pub threshold: f64,
}

impl Default for ConfigGuideMatch {
    fn default() -> Self {
        Self {
            strategy: GuideMatchStrategy::default(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl ConfigGuideMatch {
    fn prepare(&self) -> Result<(), M3uCuratorError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return create_m3u_curator_error_result!(M3uCuratorErrorKind::Info, "guide_match threshold must be within (0, 1], got {}", self.threshold);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSources {
    #[serde(default = "default_unfiltered_file")]
    pub unfiltered: String,
    #[serde(default = "default_filtered_file")]
    pub filtered: String,
    #[serde(default = "default_guide_file")]
    pub guide: String,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            unfiltered: default_unfiltered_file(),
            filtered: default_filtered_file(),
            guide: default_guide_file(),
        }
    }
}

impl ConfigSources {
    fn prepare(&mut self) -> Result<(), M3uCuratorError> {
        for (key, value) in [("unfiltered", &mut self.unfiltered), ("filtered", &mut self.filtered), ("guide", &mut self.guide)] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return create_m3u_curator_error_result!(M3uCuratorErrorKind::Info, "sources.{} can't be empty", key);
            }
            *value = trimmed.to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,
    #[serde(default)]
    pub sources: ConfigSources,
    #[serde(default)]
    pub exclude_groups: Vec<String>,
    #[serde(default)]
    pub guide_match: ConfigGuideMatch,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            backup_dir: None,
            sources: ConfigSources::default(),
            exclude_groups: vec![],
            guide_match: ConfigGuideMatch::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn prepare(&mut self) -> Result<(), M3uCuratorError> {
        if self.working_dir.trim().is_empty() {
            self.working_dir = default_working_dir();
        }
        self.working_dir = PathBuf::from(self.working_dir.trim()).clean().to_string_lossy().to_string();
        let backup_dir = self.backup_dir.take()
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(|dir| self.resolve_path(&dir).to_string_lossy().to_string());
        self.backup_dir = backup_dir;
        self.sources.prepare()?;
        self.guide_match.prepare()?;
        // group labels are matched exactly, only blank entries are dropped
        self.exclude_groups.retain(|group| !group.is_empty());
        Ok(())
    }

    /// Relative paths are resolved against the working directory.
    pub fn resolve_path(&self, file: &str) -> PathBuf {
        file_utils::get_file_path(&self.working_dir, PathBuf::from(file))
    }

    pub fn get_unfiltered_path(&self) -> PathBuf {
        self.resolve_path(&self.sources.unfiltered)
    }

    pub fn get_filtered_path(&self) -> PathBuf {
        self.resolve_path(&self.sources.filtered)
    }

    pub fn get_guide_path(&self) -> PathBuf {
        self.resolve_path(&self.sources.guide)
    }
}
