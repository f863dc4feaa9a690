//! Business detail panel
//!
//! View model of the card shown for the selected business: its details plus
//! the action area, which depends on the check-in status.

use std::fmt::Display;

use crate::catalog::Business;
use crate::controller::CheckInStatus;
use crate::map::NARROW_VIEWPORT_PX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    /// Bottom sheet on narrow screens
    BottomSheet,
    /// Card under the top controls on wide screens
    TopCard,
}

impl PanelLayout {
    #[must_use]
    pub fn for_viewport(width_px: u32) -> Self {
        if width_px < NARROW_VIEWPORT_PX {
            PanelLayout::BottomSheet
        } else {
            PanelLayout::TopCard
        }
    }
}

/// What the action area of the panel offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    /// Check-in button; the label depends on whether coordinates are known
    CheckIn { label: &'static str },
    /// Status message plus a button that reports a new location
    ConfirmUpdate {
        message: &'static str,
        label: &'static str,
    },
    /// Final status message
    Message(&'static str),
}

impl PanelAction {
    #[must_use]
    pub fn for_status(status: CheckInStatus, has_coordinates: bool) -> Self {
        match status {
            CheckInStatus::Idle if has_coordinates => PanelAction::CheckIn {
                label: "Confirm store location",
            },
            CheckInStatus::Idle => PanelAction::CheckIn {
                label: "Add/save store location",
            },
            CheckInStatus::Success => PanelAction::Message("Store location confirmed. Thank you."),
            CheckInStatus::TooFar => PanelAction::ConfirmUpdate {
                message: "You are away from the recorded location. Report a new location?",
                label: "Confirm",
            },
            CheckInStatus::UpdateRequest => {
                PanelAction::Message("Location correction request sent. Thank you.")
            }
            CheckInStatus::LocationAdded => {
                PanelAction::Message("Store location saved. Thank you.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub layout: PanelLayout,
    pub title: String,
    pub note: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Coordinates with four decimals, when known
    pub position: Option<String>,
    pub action: PanelAction,
}

impl DetailPanel {
    #[must_use]
    pub fn new(business: &Business, status: CheckInStatus, width_px: u32) -> Self {
        Self {
            layout: PanelLayout::for_viewport(width_px),
            title: business.name.trim().to_string(),
            note: business.note.clone(),
            address: business.address.clone(),
            phone: business.phone.clone(),
            position: business.coordinates.map(|c| c.format_coordinates()),
            action: PanelAction::for_status(status, business.has_coordinates()),
        }
    }
}

impl Display for DetailPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "🏪 {}", self.title)?;
        if !self.note.is_empty() {
            writeln!(f, "   {}", self.note)?;
        }
        if let Some(address) = &self.address {
            writeln!(f, "   🏠 Address: {}", address)?;
        }
        if let Some(phone) = &self.phone {
            writeln!(f, "   📞 Phone: {}", phone)?;
        }
        if let Some(position) = &self.position {
            writeln!(f, "   🗺️ Location: {}", position)?;
        }
        match &self.action {
            PanelAction::CheckIn { label } => writeln!(f, "   [ {} ]", label),
            PanelAction::ConfirmUpdate { message, label } => {
                writeln!(f, "   ⚠️ {}", message)?;
                writeln!(f, "   [ {} ]", label)
            }
            PanelAction::Message(message) => writeln!(f, "   ✅ {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use rstest::rstest;

    fn pharmacy() -> Business {
        let mut business = Business::new("1", "T.C. Pharma-Chem ")
            .at(Coordinates::new(13.826_678_422, 100.575_003_006));
        business.phone = Some("02-939-0431".to_string());
        business
    }

    #[rstest]
    #[case(true, "Confirm store location")]
    #[case(false, "Add/save store location")]
    fn test_idle_check_in_label(#[case] has_coordinates: bool, #[case] label: &'static str) {
        let action = PanelAction::for_status(CheckInStatus::Idle, has_coordinates);
        assert_eq!(action, PanelAction::CheckIn { label });
    }

    #[rstest]
    #[case(CheckInStatus::Success, "Store location confirmed. Thank you.")]
    #[case(
        CheckInStatus::UpdateRequest,
        "Location correction request sent. Thank you."
    )]
    #[case(CheckInStatus::LocationAdded, "Store location saved. Thank you.")]
    fn test_final_messages(#[case] status: CheckInStatus, #[case] message: &'static str) {
        let action = PanelAction::for_status(status, true);
        assert_eq!(action, PanelAction::Message(message));
    }

    #[test]
    fn test_too_far_offers_update() {
        let action = PanelAction::for_status(CheckInStatus::TooFar, true);
        assert_eq!(
            action,
            PanelAction::ConfirmUpdate {
                message: "You are away from the recorded location. Report a new location?",
                label: "Confirm"
            }
        );
    }

    #[test]
    fn test_panel_details() {
        let panel = DetailPanel::new(&pharmacy(), CheckInStatus::Idle, 375);
        assert_eq!(panel.layout, PanelLayout::BottomSheet);
        assert_eq!(panel.title, "T.C. Pharma-Chem");
        assert_eq!(panel.position.as_deref(), Some("13.8267, 100.5750"));
        assert!(panel.address.is_none());

        let rendered = panel.to_string();
        assert!(rendered.contains("Phone: 02-939-0431"));
        assert!(rendered.contains("[ Confirm store location ]"));
        assert!(!rendered.contains("Address"));
    }

    #[test]
    fn test_panel_without_coordinates() {
        let shop = Business::new("2", "Corner shop");
        let panel = DetailPanel::new(&shop, CheckInStatus::Idle, 1280);
        assert_eq!(panel.layout, PanelLayout::TopCard);
        assert!(panel.position.is_none());
        assert!(!panel.to_string().contains("Location:"));
    }
}
