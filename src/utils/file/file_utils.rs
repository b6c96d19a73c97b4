use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, error};
use path_clean::PathClean;

const CONFIG_FILE: &str = "config.yml";

pub fn file_writer<W>(w: W) -> BufWriter<W>
where
    W: Write,
{
    BufWriter::with_capacity(131_072, w)
}

pub fn file_reader<R>(r: R) -> BufReader<R>
where
    R: Read,
{
    BufReader::with_capacity(131_072, r)
}

pub fn get_exe_path() -> PathBuf {
    let default_path = std::path::PathBuf::from("./");
    let current_exe = std::env::current_exe();
    match current_exe {
        Ok(exe) => {
            match fs::read_link(&exe) {
                Ok(f) => f.parent().map_or(default_path, std::path::Path::to_path_buf),
                Err(_) => exe.parent().map_or(default_path, std::path::Path::to_path_buf)
            }
        }
        Err(_) => default_path
    }
}

/// `config.yml` in the current directory, otherwise next to the executable.
pub fn get_default_config_file_path() -> String {
    let local_path = PathBuf::from(CONFIG_FILE);
    if local_path.exists() {
        return String::from(CONFIG_FILE);
    }
    let exe_path = get_exe_path().join(CONFIG_FILE);
    String::from(if exe_path.exists() {
        exe_path.to_str().unwrap_or(CONFIG_FILE)
    } else {
        CONFIG_FILE
    })
}

pub fn get_file_path(wd: &str, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        PathBuf::from(wd).join(&path).clean()
    } else {
        path
    }
}

pub fn path_exists(file_path: &Path) -> bool {
    if let Ok(metadata) = fs::metadata(file_path) {
        return metadata.is_file();
    }
    false
}

#[inline]
pub fn open_file(file_name: &Path) -> Result<File, std::io::Error> {
    File::open(file_name)
}

/// Reads a text file, `None` if it does not exist. Invalid utf-8 is replaced, not rejected.
pub fn read_optional_text_file(path: &Path) -> std::io::Result<Option<String>> {
    if !path_exists(path) {
        debug!("file not found {}", path.to_string_lossy());
        return Ok(None);
    }
    let mut buffer = Vec::new();
    file_reader(open_file(path)?).read_to_end(&mut buffer)?;
    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}

/// Copies `path` into `backup_dir` with a timestamp suffix. A missing source is not an error.
pub fn backup_file(path: &Path, backup_dir: &Path) -> std::io::Result<Option<PathBuf>> {
    if !path_exists(path) {
        return Ok(None);
    }
    fs::create_dir_all(backup_dir)?;
    let filename = path.file_name().map_or_else(|| String::from("playlist"), |f| f.to_string_lossy().to_string());
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let mut backup_path = backup_dir.join(format!("{filename}_{stamp}"));
    let mut counter = 1;
    while backup_path.exists() {
        backup_path = backup_dir.join(format!("{filename}_{stamp}_{counter}"));
        counter += 1;
    }
    fs::copy(path, &backup_path)?;
    Ok(Some(backup_path))
}

/// Writes into a temp file next to `path` and moves it over the target,
/// readers never observe a half written file.
pub fn write_file_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp_file = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = file_writer(tmp_file.as_file_mut());
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
    }
    tmp_file.persist(path).map_err(|err| {
        error!("failed to move temp file to {}: {}", path.to_string_lossy(), err);
        err.error
    })?;
    Ok(())
}
