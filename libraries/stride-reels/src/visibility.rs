//! Visibility filter
//!
//! Derives the ordered visible subset of the store from the follow graph and
//! three session-scoped exclusion sets. The filter owns no reels.

use std::collections::HashSet;
use std::sync::Arc;
use stride_core::{CurrentUser, Reel, ReelId, UserId};

/// Session-scoped exclusion sets
///
/// Additive during a session; only an explicit unhide/unmute restores an
/// item. Persistence is handled by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySets {
    hidden_reel_ids: HashSet<ReelId>,
    muted_author_ids: HashSet<UserId>,
    reported_reel_ids: HashSet<ReelId>,
}

impl VisibilitySets {
    /// Empty sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a reel; returns `true` if it was not hidden already
    pub fn hide_reel(&mut self, id: ReelId) -> bool {
        self.hidden_reel_ids.insert(id)
    }

    /// Mute an author; returns `true` if they were not muted already
    pub fn mute_author(&mut self, author: UserId) -> bool {
        self.muted_author_ids.insert(author)
    }

    /// Exclude a reel the user reported
    pub fn report_reel(&mut self, id: ReelId) -> bool {
        self.reported_reel_ids.insert(id)
    }

    /// Explicit unhide
    pub fn unhide_reel(&mut self, id: &ReelId) -> bool {
        self.hidden_reel_ids.remove(id)
    }

    /// Explicit unmute
    pub fn unmute_author(&mut self, author: &UserId) -> bool {
        self.muted_author_ids.remove(author)
    }

    /// Whether `id` is hidden
    pub fn is_hidden(&self, id: &ReelId) -> bool {
        self.hidden_reel_ids.contains(id)
    }

    /// Whether `author` is muted
    pub fn is_muted(&self, author: &UserId) -> bool {
        self.muted_author_ids.contains(author)
    }

    /// Whether `id` was reported
    pub fn is_reported(&self, id: &ReelId) -> bool {
        self.reported_reel_ids.contains(id)
    }
}

/// Whether a single reel passes every rule
pub fn is_visible(reel: &Reel, viewer: &CurrentUser, sets: &VisibilitySets) -> bool {
    viewer.can_see_author(&reel.author_id)
        && !sets.is_hidden(&reel.id)
        && !sets.is_muted(&reel.author_id)
        && !sets.is_reported(&reel.id)
}

/// Visible reel ids, in store order
pub fn filter_visible(reels: &[Reel], viewer: &CurrentUser, sets: &VisibilitySets) -> Vec<ReelId> {
    reels
        .iter()
        .filter(|r| is_visible(r, viewer, sets))
        .map(|r| r.id.clone())
        .collect()
}

/// The visible list with stable identity
///
/// `refresh` swaps the shared list only when the ordered ids actually
/// changed, so a virtualized list holding the `Arc` does not remount cells
/// on a no-op refresh.
#[derive(Debug, Clone)]
pub struct VisibleReels {
    ids: Arc<[ReelId]>,
}

impl Default for VisibleReels {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibleReels {
    /// Empty list
    pub fn new() -> Self {
        Self {
            ids: Arc::from(Vec::new()),
        }
    }

    /// Re-run the filter; returns `true` if the list changed
    pub fn refresh(&mut self, reels: &[Reel], viewer: &CurrentUser, sets: &VisibilitySets) -> bool {
        let next = filter_visible(reels, viewer, sets);
        if *self.ids == *next {
            return false;
        }
        self.ids = Arc::from(next);
        true
    }

    /// Shared handle to the current list
    pub fn ids(&self) -> &Arc<[ReelId]> {
        &self.ids
    }

    /// Index of `id` in the list
    pub fn position(&self, id: &ReelId) -> Option<usize> {
        self.ids.iter().position(|v| v == id)
    }

    /// Id at `index`
    pub fn get(&self, index: usize) -> Option<&ReelId> {
        self.ids.get(index)
    }

    /// Number of visible reels
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is visible
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::ActivityType;

    fn reel(id: &str, author: &str) -> Reel {
        Reel::new(
            ReelId::new(id),
            UserId::new(author),
            format!("https://cdn/{id}.mp4"),
            ActivityType::Walk,
        )
    }

    fn viewer() -> CurrentUser {
        CurrentUser::with_following(UserId::new("me"), [UserId::new("ana"), UserId::new("bo")])
    }

    fn ids(list: &[ReelId]) -> Vec<&str> {
        list.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn follow_rule_keeps_own_and_followed() {
        let reels = vec![
            reel("1", "ana"),
            reel("2", "stranger"),
            reel("3", "me"),
            reel("4", "bo"),
        ];
        let visible = filter_visible(&reels, &viewer(), &VisibilitySets::new());
        assert_eq!(ids(&visible), vec!["1", "3", "4"]);
    }

    #[test]
    fn each_exclusion_set_applies() {
        let reels = vec![reel("1", "ana"), reel("2", "ana"), reel("3", "bo"), reel("4", "me")];
        let mut sets = VisibilitySets::new();

        sets.hide_reel(ReelId::new("1"));
        assert_eq!(ids(&filter_visible(&reels, &viewer(), &sets)), vec!["2", "3", "4"]);

        sets.mute_author(UserId::new("bo"));
        assert_eq!(ids(&filter_visible(&reels, &viewer(), &sets)), vec!["2", "4"]);

        sets.report_reel(ReelId::new("4"));
        assert_eq!(ids(&filter_visible(&reels, &viewer(), &sets)), vec!["2"]);
    }

    #[test]
    fn explicit_unmute_restores() {
        let reels = vec![reel("1", "ana")];
        let mut sets = VisibilitySets::new();
        assert!(sets.mute_author(UserId::new("ana")));
        assert!(!sets.mute_author(UserId::new("ana")));
        assert!(filter_visible(&reels, &viewer(), &sets).is_empty());

        assert!(sets.unmute_author(&UserId::new("ana")));
        assert_eq!(filter_visible(&reels, &viewer(), &sets).len(), 1);
    }

    #[test]
    fn refresh_keeps_identity_when_unchanged() {
        let reels = vec![reel("1", "ana"), reel("2", "bo")];
        let sets = VisibilitySets::new();
        let mut visible = VisibleReels::new();

        assert!(visible.refresh(&reels, &viewer(), &sets));
        let first = Arc::clone(visible.ids());

        assert!(!visible.refresh(&reels, &viewer(), &sets));
        assert!(Arc::ptr_eq(&first, visible.ids()));
    }

    #[test]
    fn refresh_swaps_list_on_change() {
        let reels = vec![reel("1", "ana"), reel("2", "bo")];
        let mut sets = VisibilitySets::new();
        let mut visible = VisibleReels::new();
        visible.refresh(&reels, &viewer(), &sets);
        let first = Arc::clone(visible.ids());

        sets.hide_reel(ReelId::new("1"));
        assert!(visible.refresh(&reels, &viewer(), &sets));
        assert!(!Arc::ptr_eq(&first, visible.ids()));
        assert_eq!(visible.position(&ReelId::new("2")), Some(0));
    }
}
