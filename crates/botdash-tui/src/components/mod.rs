pub mod guild_list;
pub mod log_panel;
pub mod queue_panel;
pub mod search_panel;
pub mod status_panel;
