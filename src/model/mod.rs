mod config;
mod config_log;
mod playlist;
mod xmltv;

pub use self::config::*;
pub use self::config_log::*;
pub use self::playlist::*;
pub use self::xmltv::*;
