//! GUI module - User interface components

mod app;
mod control_panel;
mod tab_viewer;

pub use app::DashboardApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use tab_viewer::{TabContent, TabViewer};
