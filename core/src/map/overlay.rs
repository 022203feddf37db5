use crate::model::{RestaurantId, RestaurantSummary};

/// Marker hover and detail-panel selection, held by id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    hovered: Option<RestaurantId>,
    selected: Option<RestaurantId>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&mut self, id: RestaurantId) {
        self.hovered = Some(id);
    }

    /// Pointer left marker `id`. A leave event for a marker that is no longer
    /// the hovered one is ignored.
    pub fn unhover(&mut self, id: RestaurantId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn select(&mut self, id: RestaurantId) {
        self.selected = Some(id);
    }

    pub fn dismiss(&mut self) {
        self.selected = None;
    }

    pub fn hovered(&self) -> Option<RestaurantId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<RestaurantId> {
        self.selected
    }

    pub fn is_panel_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Drops ids that no longer exist in the freshly applied list.
    pub fn retain_present(&mut self, restaurants: &[RestaurantSummary]) {
        let present = |id: RestaurantId| restaurants.iter().any(|r| r.id == id);
        if self.hovered.is_some_and(|id| !present(id)) {
            self.hovered = None;
        }
        if self.selected.is_some_and(|id| !present(id)) {
            self.selected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::restaurant;

    #[test]
    fn replacement_clears_missing_hover_and_keeps_present_selection() {
        let mut overlay = OverlayState::new();
        overlay.hover(1);
        overlay.select(2);

        overlay.retain_present(&[restaurant(2), restaurant(3)]);
        assert_eq!(overlay.hovered(), None);
        assert_eq!(overlay.selected(), Some(2));

        overlay.retain_present(&[restaurant(3)]);
        assert!(!overlay.is_panel_open());
    }

    #[test]
    fn stale_leave_event_keeps_new_hover() {
        let mut overlay = OverlayState::new();
        overlay.hover(1);
        overlay.hover(2);
        overlay.unhover(1);
        assert_eq!(overlay.hovered(), Some(2));
        overlay.unhover(2);
        assert_eq!(overlay.hovered(), None);
    }
}
