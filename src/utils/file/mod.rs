pub mod file_utils;
pub mod config_reader;
