//! Store Context
//!
//! Per-identity view of the stores it can administer, the selected store
//! and the role held there. Pure state: lookups are performed by the
//! session manager and fed in through `apply_stores` and `apply_role`.

use crate::auth::Identity;
use crate::role::Role;
use crate::store::Store;

/// Store list as last seen by the resolver
#[derive(Debug, Clone)]
pub enum StoreList {
    Pending,
    Ready(Vec<Store>),
}

/// Role lookup state for the selected store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState<'a> {
    NoStore,
    Pending { store_id: &'a str },
    /// `role` is `None` when no active membership exists
    Resolved { store_id: &'a str, role: Option<Role> },
}

#[derive(Debug, Clone, PartialEq)]
enum RoleSlot {
    NoStore,
    Pending(String),
    Resolved(String, Option<Role>),
}

#[derive(Debug, Clone)]
pub struct StoreContext {
    identity: Identity,
    stores: StoreList,
    selected: Option<Store>,
    role: RoleSlot,
    /// Auto-selection fires once per empty-to-non-empty transition
    auto_select_armed: bool,
}

impl StoreContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            stores: StoreList::Pending,
            selected: None,
            role: RoleSlot::NoStore,
            auto_select_armed: true,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Resolved stores; empty while pending
    pub fn stores(&self) -> &[Store] {
        match &self.stores {
            StoreList::Ready(stores) => stores,
            StoreList::Pending => &[],
        }
    }

    pub fn selected_store(&self) -> Option<&Store> {
        self.selected.as_ref()
    }

    pub fn selected_store_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.id.as_str())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.stores, StoreList::Pending)
    }

    pub fn has_no_stores(&self) -> bool {
        matches!(&self.stores, StoreList::Ready(stores) if stores.is_empty())
    }

    pub fn role_state(&self) -> RoleState<'_> {
        match &self.role {
            RoleSlot::NoStore => RoleState::NoStore,
            RoleSlot::Pending(store_id) => RoleState::Pending { store_id },
            RoleSlot::Resolved(store_id, role) => RoleState::Resolved { store_id, role: *role },
        }
    }

    pub fn is_role_pending(&self) -> bool {
        matches!(self.role, RoleSlot::Pending(_))
    }

    pub fn user_role(&self) -> Option<Role> {
        match self.role {
            RoleSlot::Resolved(_, role) => role,
            _ => None,
        }
    }

    /// Take a freshly resolved store list.
    ///
    /// Returns `true` when the selected store changed, meaning the role has
    /// to be looked up again.
    pub fn apply_stores(&mut self, stores: Vec<Store>) -> bool {
        let previous = self.selected_store_id().map(str::to_string);

        if stores.is_empty() {
            self.auto_select_armed = true;
            self.selected = None;
        } else if let Some(current) = &self.selected {
            match stores.iter().find(|s| s.id == current.id) {
                Some(fresh) => self.selected = Some(fresh.clone()),
                None => {
                    self.selected = None;
                    self.auto_select_armed = true;
                }
            }
        }

        if self.selected.is_none() && self.auto_select_armed {
            if let Some(pick) = auto_select(&stores) {
                self.selected = Some(pick.clone());
                self.auto_select_armed = false;
            }
        }

        self.stores = StoreList::Ready(stores);
        self.on_selection(previous)
    }

    /// Manual selection. `None` clears it and disables auto-selection until
    /// the store list next goes empty.
    ///
    /// Returns `false` for a store id that is not in the resolved list.
    pub fn select_store(&mut self, store_id: Option<&str>) -> bool {
        let previous = self.selected_store_id().map(str::to_string);

        match store_id {
            Some(id) => {
                let Some(store) = self.stores().iter().find(|s| s.id == id).cloned() else {
                    return false;
                };
                self.selected = Some(store);
            }
            None => self.selected = None,
        }
        self.auto_select_armed = false;
        self.on_selection(previous);
        true
    }

    /// Take a role lookup result issued for `store_id`.
    ///
    /// Results for a store that is no longer selected are discarded; returns
    /// whether the result was applied.
    pub fn apply_role(&mut self, store_id: &str, role: Option<Role>) -> bool {
        if self.selected_store_id() != Some(store_id) {
            return false;
        }
        self.role = RoleSlot::Resolved(store_id.to_string(), role);
        true
    }

    fn on_selection(&mut self, previous: Option<String>) -> bool {
        let current = self.selected_store_id().map(str::to_string);
        if current == previous {
            return false;
        }
        self.role = match current {
            Some(id) => RoleSlot::Pending(id),
            None => RoleSlot::NoStore,
        };
        true
    }
}

/// First active store, else the first store
fn auto_select(stores: &[Store]) -> Option<&Store> {
    stores.iter().find(|s| s.is_active()).or_else(|| stores.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreStatus;

    fn store(id: &str, active: bool) -> Store {
        let mut s = Store::new(id.to_uppercase(), id, "root");
        s.id = id.to_string();
        if !active {
            s.status = StoreStatus::Inactive;
        }
        s
    }

    fn context() -> StoreContext {
        StoreContext::new(Identity::new("u1", "u1@example.com", "U One"))
    }

    #[test]
    fn test_new_context_is_loading() {
        let ctx = context();
        assert!(ctx.is_loading());
        assert!(!ctx.has_no_stores());
        assert!(ctx.selected_store().is_none());
        assert_eq!(ctx.role_state(), RoleState::NoStore);
    }

    #[test]
    fn test_auto_selects_first_active_store() {
        let mut ctx = context();
        let changed = ctx.apply_stores(vec![store("a", false), store("b", true)]);
        assert!(changed);
        assert_eq!(ctx.selected_store_id(), Some("b"));
        assert!(ctx.is_role_pending());
        assert!(!ctx.is_loading());
    }

    #[test]
    fn test_falls_back_to_first_store_when_none_active() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", false), store("c", false)]);
        assert_eq!(ctx.selected_store_id(), Some("a"));
    }

    #[test]
    fn test_empty_list_means_no_stores() {
        let mut ctx = context();
        assert!(!ctx.apply_stores(vec![]));
        assert!(ctx.has_no_stores());
        assert!(!ctx.is_loading());
        assert_eq!(ctx.user_role(), None);
    }

    #[test]
    fn test_manual_selection_survives_refresh() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true), store("b", true)]);
        assert!(ctx.select_store(Some("b")));
        assert!(!ctx.apply_stores(vec![store("a", true), store("b", true)]));
        assert_eq!(ctx.selected_store_id(), Some("b"));
    }

    #[test]
    fn test_manual_clear_is_not_overridden() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true)]);
        assert!(ctx.select_store(None));
        ctx.apply_stores(vec![store("a", true), store("b", true)]);
        assert!(ctx.selected_store().is_none());
        assert_eq!(ctx.role_state(), RoleState::NoStore);
    }

    #[test]
    fn test_auto_selection_rearms_after_empty_list() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true)]);
        ctx.select_store(None);
        ctx.apply_stores(vec![]);
        ctx.apply_stores(vec![store("b", true)]);
        assert_eq!(ctx.selected_store_id(), Some("b"));
    }

    #[test]
    fn test_vanished_selection_is_replaced() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true), store("b", true)]);
        ctx.select_store(Some("b"));
        ctx.apply_role("b", Some(Role::Owner));

        assert!(ctx.apply_stores(vec![store("a", true)]));
        assert_eq!(ctx.selected_store_id(), Some("a"));
        assert!(ctx.is_role_pending());
        assert_eq!(ctx.user_role(), None);
    }

    #[test]
    fn test_unknown_store_cannot_be_selected() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true)]);
        assert!(!ctx.select_store(Some("zzz")));
        assert_eq!(ctx.selected_store_id(), Some("a"));
    }

    #[test]
    fn test_role_resolution_for_selected_store() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("s", true), store("s2", true)]);
        assert!(ctx.apply_role("s", Some(Role::Editor)));
        assert_eq!(ctx.user_role(), Some(Role::Editor));

        ctx.select_store(Some("s2"));
        assert!(ctx.apply_role("s2", None));
        assert_eq!(ctx.user_role(), None);
        assert_eq!(ctx.role_state(), RoleState::Resolved { store_id: "s2", role: None });
    }

    #[test]
    fn test_stale_role_result_is_discarded() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true), store("b", true)]);
        // Lookup for "a" is in flight when the user switches to "b"
        ctx.select_store(Some("b"));
        assert!(!ctx.apply_role("a", Some(Role::Owner)));
        assert!(ctx.is_role_pending());
        assert_eq!(ctx.user_role(), None);
    }

    #[test]
    fn test_refresh_updates_selected_store_details() {
        let mut ctx = context();
        ctx.apply_stores(vec![store("a", true)]);
        ctx.apply_role("a", Some(Role::Viewer));

        let mut renamed = store("a", true);
        renamed.name = "Renamed".to_string();
        assert!(!ctx.apply_stores(vec![renamed]));
        assert_eq!(ctx.selected_store().map(|s| s.name.as_str()), Some("Renamed"));
        assert_eq!(ctx.user_role(), Some(Role::Viewer));
    }
}
