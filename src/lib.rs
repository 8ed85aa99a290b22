//! Course group roster daemon: parses pasted rosters and group lists, keeps
//! the course/group aggregate, and derives search, schedule and CSV views.

pub mod backup;
pub mod config;
pub mod dates;
pub mod db;
pub mod debounce;
pub mod export;
pub mod ipc;
pub mod model;
pub mod parser;
pub mod roster;
pub mod store;
pub mod views;
