//! Terminal dashboard for airline review analytics.
//!
//! The [`App`] owns every panel and drives them from a single event queue.
//! Panels fetch through the [`airsight_client::Gateway`] on background tasks
//! and hand results back as [`AppEvent::Fetched`].

pub mod app;
pub mod chart;
pub mod components;
pub mod error;
pub mod events;
pub mod fetch;
pub mod geo;
pub mod highlight;
pub mod layout;
pub mod pages;
pub mod panels;
pub mod table;
pub mod terminal;
pub mod theme;
pub mod wordcloud;

pub use app::{run_dashboard, App};
pub use error::{Result, TuiError};
pub use events::{AppEvent, InputMode, KeyAction};
pub use pages::Page;
pub use theme::{ComponentType, ThemeManager};
