pub mod api;
pub mod calendar;
pub mod checklist;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod html;
pub mod import;
pub mod init_tracing;
pub mod matrix;
pub mod model;
pub mod names;
pub mod roster;
pub mod weekday;
