pub mod navigation;
pub mod scoring;
pub mod selection;

pub use navigation::{Level, NavigationError, Navigator, ViewMode};
pub use selection::{Selection, SelectionSummary};
