pub mod client;
pub mod config;
pub mod export;
pub mod platform;
pub mod protocol;
pub mod refresh;
pub mod search;
pub mod tracker;
pub mod ui_state;
