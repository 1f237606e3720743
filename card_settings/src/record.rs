//! The persisted settings record.
//!
//! One JSON object per store:
//!
//! ```json
//! {
//!   "cardAmount": 8,
//!   "cardContents": [{ "id": 1, "text": "Lucky Card 1" }, ...],
//!   "moveSpeed": 1.0,
//!   "deleteDrawnCard": false
//! }
//! ```
//!
//! The record is deliberately loose (signed count, unchecked label list);
//! [`Settings::from_record`](crate::Settings::from_record) does the
//! validation.

use serde::{Deserialize, Serialize};

use crate::settings::CardLabel;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub card_amount:   i64,
    pub card_contents: Vec<CardLabel>,
    pub move_speed:    f64,
    /// Absent in records written before card removal existed.
    #[serde(default)]
    pub delete_drawn_card: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_camel_case_field_names() {
        let rec = SettingsRecord {
            card_amount:       3,
            card_contents:     vec![CardLabel { id: 1, text: "A".into() }],
            move_speed:        1.0,
            delete_drawn_card: false,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["cardAmount"], 3);
        assert_eq!(json["cardContents"][0]["text"], "A");
        assert_eq!(json["moveSpeed"], 1.0);
        assert_eq!(json["deleteDrawnCard"], false);
    }
}
