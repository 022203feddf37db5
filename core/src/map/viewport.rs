use crate::model::{BoundingBox, CategoryFilter};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportSnapshot {
    pub bounds: Option<BoundingBox>,
    pub category: CategoryFilter,
}

/// Raw (undebounced) map bounds plus the category filter, observable through
/// `watch` receivers. Observers wake only on actual value changes.
#[derive(Debug)]
pub struct ViewportState {
    tx: watch::Sender<ViewportSnapshot>,
}

impl ViewportState {
    pub fn new(category: CategoryFilter) -> Self {
        let (tx, _) = watch::channel(ViewportSnapshot {
            bounds: None,
            category,
        });
        Self { tx }
    }

    /// Returns `true` when the stored bounds changed.
    pub fn set_bounds(&self, bounds: BoundingBox) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.bounds == Some(bounds) {
                return false;
            }
            snapshot.bounds = Some(bounds);
            true
        })
    }

    /// Returns `true` when the filter changed.
    pub fn set_category(&self, category: CategoryFilter) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.category == category {
                return false;
            }
            snapshot.category = category;
            true
        })
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.tx.borrow().bounds
    }

    pub fn category(&self) -> CategoryFilter {
        self.tx.borrow().category
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewportSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(None)
    }
}
