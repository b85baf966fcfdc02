pub mod job_panel;
pub mod log_panel;
pub mod refresh_panel;
pub mod search_panel;
pub mod tracks_panel;
