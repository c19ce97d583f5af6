use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Promotional popup shown to storefront visitors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OfferPopup {
    pub id: i32,
    pub title: String,
    pub message: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OfferPopup {
    /// Whether the popup is switched on and `now` falls inside its window.
    pub fn is_live_at(&self, now: NaiveDateTime) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|starts_at| starts_at <= now)
            && self.ends_at.is_none_or(|ends_at| now < ends_at)
    }
}

/// Values written when creating or replacing an offer popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferPopupData {
    pub title: String,
    pub message: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
    }

    fn popup(
        is_active: bool,
        starts_at: Option<NaiveDateTime>,
        ends_at: Option<NaiveDateTime>,
    ) -> OfferPopup {
        OfferPopup {
            id: 1,
            title: "Eid sale".to_string(),
            message: "20% off all pods".to_string(),
            image_url: None,
            link_url: None,
            is_active,
            starts_at,
            ends_at,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[test]
    fn live_window_is_half_open() {
        let scheduled = popup(true, Some(at(5)), Some(at(10)));

        assert!(!scheduled.is_live_at(at(4)));
        assert!(scheduled.is_live_at(at(5)));
        assert!(!scheduled.is_live_at(at(10)));
    }

    #[test]
    fn inactive_popup_is_never_live() {
        assert!(!popup(false, None, None).is_live_at(at(3)));
        assert!(popup(true, None, None).is_live_at(at(3)));
    }
}
