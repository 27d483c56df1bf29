//! Surface layout and menu descriptors

pub mod menu;
pub mod surface;

pub use menu::{ConfigAction, Menu, MenuEntry, WidgetAction};
pub use surface::{DragCommit, Handle, PagedSurface, PlacedWidget};
