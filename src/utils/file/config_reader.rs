use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

use log::info;
use regex::Regex;

use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind, create_m3u_curator_error_result};
use crate::model::Config;
use crate::utils::file::file_utils;

static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{env:(?P<var>[a-zA-Z_][a-zA-Z0-9_]*)}").unwrap());

pub fn resolve_env_var(value: &str) -> String {
    ENV_REGEX.replace_all(value, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| format!("${{env:{var_name}}}"))
    }).to_string()
}

pub fn parse_config(content: &str) -> Result<Config, M3uCuratorError> {
    match serde_yaml::from_str::<Config>(&resolve_env_var(content)) {
        Ok(mut cfg) => {
            cfg.prepare()?;
            Ok(cfg)
        }
        Err(err) => create_m3u_curator_error_result!(M3uCuratorErrorKind::Info, "cant read config file: {}", err)
    }
}

/// Reads the yaml config. Without a file on disk the defaults apply.
pub fn read_config(config_file: &str) -> Result<Config, M3uCuratorError> {
    let path = PathBuf::from(config_file);
    match file_utils::read_optional_text_file(&path) {
        Ok(Some(content)) => {
            let cfg = parse_config(&content)?;
            info!("Config File: {}", config_file);
            Ok(cfg)
        }
        Ok(None) => {
            info!("Config file {} not found, using defaults", config_file);
            let mut cfg = Config::default();
            cfg.prepare()?;
            Ok(cfg)
        }
        Err(err) => create_m3u_curator_error_result!(M3uCuratorErrorKind::Info, "cant read config file {}: {}", config_file, err)
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::file::config_reader::{parse_config, read_config, resolve_env_var};

    #[test]
    fn test_resolve() {
        let resolved = resolve_env_var("${env:HOME}");
        assert_eq!(resolved, std::env::var("HOME").unwrap());
        assert_eq!(resolve_env_var("${env:M3U_CURATOR_SURELY_UNSET}"), "${env:M3U_CURATOR_SURELY_UNSET}");
    }

    #[test]
    fn test_parse_config_with_env() {
        let home = std::env::var("HOME").unwrap();
        let cfg = parse_config("working_dir: ${env:HOME}/iptv\n").unwrap();
        assert_eq!(cfg.working_dir, format!("{home}/iptv"));
    }

    #[test]
    fn test_read_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = read_config(dir.path().join("config.yml").to_str().unwrap()).unwrap();
        assert_eq!(cfg.sources.unfiltered, "unfiltered.m3u");
        assert_eq!(cfg.working_dir, "data");
    }

    #[test]
    fn test_read_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "exclude_groups: [unclosed\n").unwrap();
        assert!(read_config(path.to_str().unwrap()).is_err());
    }
}
