//! Core traits and types for homeboard

mod host;
mod record;
mod scheduler;
mod store;

pub use host::{
    ConfigureRef, HostError, PreviewHandle, ProviderInfo, ProviderRef, SimHost, WidgetHost,
    WidgetView,
};
pub use record::{WidgetId, WidgetRecord};
pub use scheduler::RetryTimer;
pub use store::{MemoryStore, WidgetStore};
