pub mod m3u_repository;
pub mod source_repository;
