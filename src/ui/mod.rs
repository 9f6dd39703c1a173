//! egui rendering: panels, tabs, and chart drawing.

pub mod panels;
pub mod plot;
pub mod tabs;
