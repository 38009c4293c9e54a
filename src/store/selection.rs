//! Selection state and navigation over the ordered view.

use super::records::{BookHandle, RecordStore};

/// Current position in the ordered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    At(usize),
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::None => None,
            Selection::At(index) => Some(index),
        }
    }
}

/// Navigation over the ordered view. Requests outside the view are clamped,
/// never rejected.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selection: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Handle of the selected record, if any.
    pub fn selected_handle(&self, store: &RecordStore) -> Option<BookHandle> {
        self.selection.index().and_then(|idx| store.handle_at(idx))
    }

    pub fn go_first(&mut self, count: usize) {
        self.selection = if count > 0 {
            Selection::At(0)
        } else {
            Selection::None
        };
    }

    pub fn go_last(&mut self, count: usize) {
        self.selection = match count {
            0 => Selection::None,
            n => Selection::At(n - 1),
        };
    }

    pub fn go_next(&mut self, count: usize) {
        if let Selection::At(index) = self.selection {
            self.selection = Selection::At((index + 1).min(count.saturating_sub(1)));
        }
        self.clamp(count);
    }

    pub fn go_previous(&mut self, count: usize) {
        if let Selection::At(index) = self.selection {
            self.selection = Selection::At(index.saturating_sub(1));
        }
        self.clamp(count);
    }

    /// Select a row directly, clamping past-the-end requests to the last row.
    pub fn select(&mut self, index: usize, count: usize) {
        self.selection = if count == 0 {
            Selection::None
        } else {
            Selection::At(index.min(count - 1))
        };
    }

    /// Point the selection at a specific record, or clear it when the record
    /// is not in the view.
    pub fn select_handle(&mut self, store: &RecordStore, handle: BookHandle) {
        self.selection = store
            .position(handle)
            .map(Selection::At)
            .unwrap_or(Selection::None);
    }

    /// Re-anchor after the view changed. `previous` is the record that was
    /// selected before the change; when it is still visible the selection
    /// follows it, otherwise the old index is clamped into the new view.
    pub fn reconcile(&mut self, store: &RecordStore, previous: Option<BookHandle>) {
        if let Some(position) = previous.and_then(|handle| store.position(handle)) {
            self.selection = Selection::At(position);
            return;
        }
        self.clamp(store.len());
    }

    fn clamp(&mut self, count: usize) {
        if let Selection::At(index) = self.selection {
            self.selection = if count == 0 {
                Selection::None
            } else {
                Selection::At(index.min(count - 1))
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, SortKey};
    use crate::store::SortState;

    fn at(index: usize) -> SelectionController {
        SelectionController {
            selection: Selection::At(index),
        }
    }

    #[test]
    fn first_and_last_depend_on_count() {
        let mut nav = SelectionController::new();
        nav.go_first(0);
        assert_eq!(nav.selection(), Selection::None);
        nav.go_last(0);
        assert_eq!(nav.selection(), Selection::None);

        nav.go_first(4);
        assert_eq!(nav.selection(), Selection::At(0));
        nav.go_last(4);
        assert_eq!(nav.selection(), Selection::At(3));
    }

    #[test]
    fn next_then_previous_round_trips_inside_bounds() {
        for count in 1..6 {
            for start in 0..count {
                let mut nav = at(start);
                nav.go_next(count);
                nav.go_previous(count);
                let expected = if start == count - 1 {
                    start.saturating_sub(1)
                } else {
                    start
                };
                assert_eq!(
                    nav.selection(),
                    Selection::At(expected),
                    "count={count} start={start}"
                );
            }
        }
    }

    #[test]
    fn boundaries_are_idempotent() {
        let mut nav = at(2);
        nav.go_next(3);
        nav.go_next(3);
        assert_eq!(nav.selection(), Selection::At(2));

        let mut nav = at(0);
        nav.go_previous(3);
        nav.go_previous(3);
        assert_eq!(nav.selection(), Selection::At(0));
    }

    #[test]
    fn stepping_without_selection_is_a_no_op() {
        let mut nav = SelectionController::new();
        nav.go_next(3);
        assert_eq!(nav.selection(), Selection::None);
        nav.go_previous(3);
        assert_eq!(nav.selection(), Selection::None);
    }

    #[test]
    fn select_clamps_to_view() {
        let mut nav = SelectionController::new();
        nav.select(10, 3);
        assert_eq!(nav.selection(), Selection::At(2));
        nav.select(1, 0);
        assert_eq!(nav.selection(), Selection::None);
    }

    #[test]
    fn reconcile_follows_record_through_resort() {
        let mut store = RecordStore::new();
        store.insert(Book::new("Zeta", "", ""));
        let alpha = store.insert(Book::new("Alpha", "", ""));
        let mut nav = at(1);

        let previous = nav.selected_handle(&store);
        assert_eq!(previous, Some(alpha));
        store.set_sort(Some(SortState::ascending(SortKey::Title)));
        nav.reconcile(&store, previous);

        assert_eq!(nav.selection(), Selection::At(0));
    }

    #[test]
    fn reconcile_clamps_after_removal() {
        let mut store = RecordStore::new();
        store.insert(Book::new("A", "", ""));
        let last = store.insert(Book::new("B", "", ""));
        let mut nav = at(1);

        store.remove(last);
        nav.reconcile(&store, Some(last));
        assert_eq!(nav.selection(), Selection::At(0));

        let only = store.handle_at(0).unwrap();
        store.remove(only);
        nav.reconcile(&store, Some(only));
        assert_eq!(nav.selection(), Selection::None);
    }
}
