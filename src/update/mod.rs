//! Self-update: remote version check and cancellable artifact download.

pub mod checker;
pub mod version;

pub use checker::{UpdateInfo, VersionChecker, download_update};
pub use version::Version;
