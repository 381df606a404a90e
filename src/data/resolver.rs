//! Resolution of the entity to monitor.
//!
//! An explicit operator selection always wins. Without one, the first entry
//! of the discovery list is picked, once per list instance, and reported back
//! so the caller can persist it as if the operator had chosen it.

/// Result of one [`TargetResolver::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<T> {
    /// The effective target; `None` means dependent sources must suspend.
    pub target: Option<T>,
    /// Set exactly once per discovery list when its first entry was picked.
    pub auto_selected: Option<T>,
    /// The effective target differs from the previous resolution.
    pub changed: bool,
}

/// Chooses the monitored entity from an explicit selection and a discovery list.
#[derive(Debug, Clone)]
pub struct TargetResolver<T> {
    explicit: Option<T>,
    discovery: Option<Vec<T>>,
    auto_selected: bool,
    effective: Option<T>,
}

impl<T> Default for TargetResolver<T> {
    fn default() -> Self {
        Self {
            explicit: None,
            discovery: None,
            auto_selected: false,
            effective: None,
        }
    }
}

impl<T: Clone + PartialEq> TargetResolver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit selection. Takes effect on the next `resolve`.
    pub fn select(&mut self, target: T) {
        self.explicit = Some(target);
    }

    /// Drop the explicit selection, falling back to discovery.
    pub fn clear_selection(&mut self) {
        self.explicit = None;
    }

    /// Install a freshly fetched discovery list.
    ///
    /// Each call is a new list instance and re-arms the one-time auto-select.
    pub fn set_discovery(&mut self, list: Vec<T>) {
        self.discovery = Some(list);
        self.auto_selected = false;
    }

    /// Forget the discovery list (e.g. when unmounting).
    pub fn clear_discovery(&mut self) {
        self.discovery = None;
        self.auto_selected = false;
    }

    /// Compute the effective target.
    pub fn resolve(&mut self) -> Resolution<T> {
        let mut auto_selected = None;

        let target = if let Some(explicit) = &self.explicit {
            Some(explicit.clone())
        } else {
            match self.discovery.as_ref().and_then(|list| list.first()) {
                Some(first) => {
                    if !self.auto_selected {
                        self.auto_selected = true;
                        auto_selected = Some(first.clone());
                    }
                    Some(first.clone())
                }
                None => None,
            }
        };

        let changed = target != self.effective;
        self.effective = target.clone();

        Resolution {
            target,
            auto_selected,
            changed,
        }
    }
}
