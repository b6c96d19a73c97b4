pub mod m3u_curator_error;
pub mod utils;
pub mod model;
pub mod processing;
pub mod repository;
