mod common;
mod confirm_dialog;
mod explorer;
mod formats;
mod home;
mod overlays;
mod rating;

pub use confirm_dialog::render_confirm_dialog;
pub use explorer::render_explorer;
pub use formats::render_format_browser;
pub use home::render_home;
pub use overlays::{render_loading, render_notification, render_update_progress};
pub use rating::render_rating_dialog;
