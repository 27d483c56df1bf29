//! Persisted widget layout records

use serde::{Deserialize, Serialize};

/// Identifier allocated by the widget host service.
pub type WidgetId = i32;

/// Persisted layout entry for one placed widget.
///
/// Page and position are implicit in the surface layout; only the
/// host-assigned identifier and the pixel size survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub widget_id: WidgetId,
    pub width: i32,
    pub height: i32,
}

impl WidgetRecord {
    pub fn new(widget_id: WidgetId, width: i32, height: i32) -> Self {
        Self {
            widget_id,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialization() {
        let rec = WidgetRecord::new(42, 320, 180);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"widget_id\":42"));

        let back: WidgetRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
