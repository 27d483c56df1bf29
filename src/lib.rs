//! homeboard: widget hosting for a paged home surface
//!
//! This library reconciles an external widget-host registry against a
//! locally persisted layout store, places widget views on a multi-page
//! surface, and drives the interactive move/resize/remove session and the
//! pick→bind→configure creation workflow:
//! - Host adapter trait and record store collaborators
//! - Startup reconciliation with host-not-ready retry
//! - Paged surface with fractional wallpaper-style scrolling
//! - Menu descriptors for the widget control surface

pub mod config;
pub mod core;
pub mod manager;
pub mod ui;

// Re-export commonly used types
pub use crate::core::{MemoryStore, SimHost, WidgetHost, WidgetId, WidgetRecord, WidgetStore};
pub use config::{FileStore, SurfaceConfig};
pub use manager::{ExternalRequest, Outcome, ResultPayload, WidgetManager};
pub use ui::{Handle, Menu, MenuEntry, PagedSurface};
