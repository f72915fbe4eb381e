//! Automobile sales statistics dashboard.
//!
//! The binary is a thin shell: it loads configuration and the dataset,
//! then hands an [`state::AppState`] to the egui window in [`app`]. The
//! report pipeline in [`report`] is pure and usable without a window.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod ui;
