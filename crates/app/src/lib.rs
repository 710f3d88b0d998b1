#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod dashboard;
pub mod settings;

pub use dashboard::{Dashboard, Snapshot};
pub use settings::{Settings, Theme, ViewMode};
