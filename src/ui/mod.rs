//! Presentation layer: selector panels and chart rendering.

pub mod panels;
pub mod plot;
