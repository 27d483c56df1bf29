//! Menu descriptors
//!
//! Menus are plain data consumed by a generic menu-rendering collaborator.
//! Each entry kind carries only the fields it needs; consumers match on the
//! variant instead of downcasting item subtypes.

use crate::core::{PreviewHandle, WidgetId};

pub const MENU_WIDGET_ADD: &str = "Add widget";
pub const MENU_WIDGET_CONFIGURE: &str = "Configure widget";
pub const MENU_WIDGET_REMOVE: &str = "Remove widget";

pub const CFG_WIDGET_MOVE: &str = "Move";
pub const CFG_WIDGET_MOVE_SWITCH: &str = "Switch move mode";
pub const CFG_WIDGET_MOVE_EXIT: &str = "Exit move mode";
pub const CFG_WIDGET_RESIZE: &str = "Resize";
pub const CFG_WIDGET_RESIZE_SWITCH: &str = "Switch resize mode";
pub const CFG_WIDGET_RESIZE_EXIT: &str = "Exit resize mode";
pub const CFG_WIDGET_REMOVE: &str = "Remove";

/// Top-level surface actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Add,
    Configure,
    Remove,
}

/// Per-widget actions offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Move,
    MoveSwitch,
    Resize,
    ResizeSwitch,
    Reset,
    Remove,
}

/// One menu line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Section heading, not activatable.
    Title(String),
    /// Plain informational line, e.g. debug details or an inline error.
    Note(String),
    /// Top-level surface action.
    Config { label: String, action: ConfigAction },
    /// Action on a specific placed widget.
    WidgetAction { label: String, action: WidgetAction },
    /// A widget picked from the existing set.
    Widget {
        widget_id: WidgetId,
        label: String,
        preview: Option<PreviewHandle>,
    },
}

/// Ordered list of entries for one popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MenuEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The widget actions present, in menu order.
    pub fn widget_actions(&self) -> Vec<WidgetAction> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::WidgetAction { action, .. } => Some(*action),
                _ => None,
            })
            .collect()
    }

    /// The top-level actions present, in menu order.
    pub fn config_actions(&self) -> Vec<ConfigAction> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Config { action, .. } => Some(*action),
                _ => None,
            })
            .collect()
    }
}
