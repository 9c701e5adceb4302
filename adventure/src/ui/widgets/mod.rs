//! TUI widgets for the adventure

pub mod choices;
pub mod input;
pub mod narrative;
pub mod scene;
pub mod sidebar;
pub mod status_bar;

pub use choices::ChoicesWidget;
pub use input::InputWidget;
pub use narrative::NarrativeWidget;
pub use scene::ScenePanelWidget;
pub use sidebar::SidebarWidget;
pub use status_bar::{HotkeyBarWidget, StatusBarWidget};
