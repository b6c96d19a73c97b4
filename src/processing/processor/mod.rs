pub mod catalog;
pub mod epg;
pub mod identity;
pub mod selection;
