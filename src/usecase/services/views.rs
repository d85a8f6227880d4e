use std::cell::Cell;
use std::rc::Rc;

use crate::usecase::services::overrides::{ListenerId, OverrideStore};

/// A value derived from the override store, re-derived lazily after any
/// override mutation.
///
/// One-shot CLI commands derive their rows once and do not need it. A
/// long-lived front end keeps one cache per table (detail, notes) over a
/// shared store, so an edit made in either table re-derives both.
pub struct ViewCache<T> {
    stale: Rc<Cell<bool>>,
    value: Option<T>,
    listener: ListenerId,
}

impl<T> ViewCache<T> {
    pub fn attach(store: &mut OverrideStore) -> Self {
        let stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&stale);
        let listener = store.subscribe(move |_| flag.set(true));
        Self {
            stale,
            value: None,
            listener,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale.get() || self.value.is_none()
    }

    /// Marks the view stale without an override change, e.g. after the
    /// selection changed.
    pub fn invalidate(&self) {
        self.stale.set(true);
    }

    pub fn get_or_refresh(&mut self, derive: impl FnOnce() -> T) -> &T {
        if self.stale.replace(false) {
            self.value = None;
        }
        self.value.get_or_insert_with(derive)
    }

    pub fn detach(self, store: &mut OverrideStore) {
        store.unsubscribe(self.listener);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infra::memory::MemorySlotStore;

    #[test]
    fn both_views_rederive_after_a_write_from_either() {
        let mut store = OverrideStore::load(Arc::new(MemorySlotStore::default()));
        let mut detail: ViewCache<String> = ViewCache::attach(&mut store);
        let mut notes: ViewCache<String> = ViewCache::attach(&mut store);

        let compiled = "Light leak from bathroom faucet.";
        assert_eq!(detail.get_or_refresh(|| store.merge_note("310", compiled)), compiled);
        assert_eq!(notes.get_or_refresh(|| store.merge_note("310", compiled)), compiled);
        assert!(!detail.is_stale());

        store.set_note("310", "").expect("should set note");
        assert!(detail.is_stale());
        assert!(notes.is_stale());
        assert_eq!(notes.get_or_refresh(|| store.merge_note("310", compiled)), "");
        assert_eq!(detail.get_or_refresh(|| store.merge_note("310", compiled)), "");
    }

    #[test]
    fn cached_value_is_reused_until_invalidated() {
        let mut store = OverrideStore::load(Arc::new(MemorySlotStore::default()));
        let mut view: ViewCache<usize> = ViewCache::attach(&mut store);
        let mut calls = 0;
        view.get_or_refresh(|| {
            calls += 1;
            1
        });
        view.get_or_refresh(|| {
            calls += 1;
            2
        });
        assert_eq!(calls, 1);

        view.invalidate();
        assert_eq!(*view.get_or_refresh(|| 3), 3);

        view.detach(&mut store);
        store.set_note("1", "x").expect("should set note");
    }
}
