pub mod backup;
pub mod core;
pub mod courses;
pub mod export;
pub mod groups;
pub mod roster;
pub mod session;
pub mod views;
