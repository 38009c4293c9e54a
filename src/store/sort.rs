//! Ordering of the catalog view.
//!
//! Two entry points change the active sort and they intentionally disagree
//! about direction:
//! - a column-header click applies the controller's pending direction to the
//!   clicked column and then flips it, whichever column was clicked before;
//! - choosing an attribute by name always sorts ascending and leaves the
//!   pending column direction alone.

use std::cmp::Ordering;

use log::{info, warn};

use crate::models::{Book, SortError, SortKey};

use super::records::RecordStore;

/// The single active sort descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortState {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            ascending: true,
        }
    }

    /// Compare two books on the active key. Missing values are smaller than
    /// any present value, so they lead ascending views and trail descending
    /// ones. Present values compare byte-wise.
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let ordering = compare_values(a.sort_value(self.key), b.sort_value(self.key));
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

fn compare_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

#[derive(Debug, Clone)]
pub struct SortController {
    /// Direction the next column click will apply.
    column_ascending: bool,
}

impl Default for SortController {
    fn default() -> Self {
        Self {
            column_ascending: true,
        }
    }
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction the next column click will use.
    pub fn next_column_ascending(&self) -> bool {
        self.column_ascending
    }

    /// Column-header path: sort by `key` with the pending direction, then
    /// toggle the pending direction for the next click.
    pub fn sort_by_column(&mut self, store: &mut RecordStore, key: SortKey) -> SortState {
        let state = SortState {
            key,
            ascending: self.column_ascending,
        };
        store.set_sort(Some(state));
        self.column_ascending = !self.column_ascending;
        info!(
            "event=sort module=sort status=ok path=column key={} ascending={}",
            key, state.ascending
        );
        state
    }

    /// Attribute path: `name` is free text such as the content of a combo box.
    /// Valid names sort ascending; anything else is rejected without touching
    /// the store.
    pub fn sort_by_attribute(
        &mut self,
        store: &mut RecordStore,
        name: &str,
    ) -> Result<SortState, SortError> {
        let key = match name.parse::<SortKey>() {
            Ok(key) => key,
            Err(err) => {
                warn!("event=sort module=sort status=rejected path=attribute error={err}");
                return Err(err);
            }
        };
        let state = SortState::ascending(key);
        store.set_sort(Some(state));
        info!("event=sort module=sort status=ok path=attribute key={key} ascending=true");
        Ok(state)
    }

    /// Active sort as shown by the header indicator.
    pub fn indicator(&self, store: &RecordStore) -> Option<SortState> {
        store.sort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &RecordStore) -> Vec<Option<String>> {
        store.all().into_iter().map(|b| b.title.clone()).collect()
    }

    fn store_with(books: &[(&str, &str, &str)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (title, author, year) in books {
            store.insert(Book::new(title, author, year));
        }
        store
    }

    #[test]
    fn column_click_toggles_direction() {
        let mut store = store_with(&[("Zeta", "A", "2000"), ("Alpha", "B", "1999")]);
        let mut sorter = SortController::new();

        let first = sorter.sort_by_column(&mut store, SortKey::Title);
        assert!(first.ascending);
        assert_eq!(
            titles(&store),
            vec![Some("Alpha".to_string()), Some("Zeta".to_string())]
        );

        let second = sorter.sort_by_column(&mut store, SortKey::Title);
        assert!(!second.ascending);
        assert_eq!(
            titles(&store),
            vec![Some("Zeta".to_string()), Some("Alpha".to_string())]
        );
    }

    #[test]
    fn column_click_on_new_key_keeps_pending_direction() {
        let mut store = store_with(&[("B", "x", "2001"), ("A", "y", "1999")]);
        let mut sorter = SortController::new();

        sorter.sort_by_column(&mut store, SortKey::Title);
        let state = sorter.sort_by_column(&mut store, SortKey::Year);

        assert_eq!(state.key, SortKey::Year);
        assert!(!state.ascending, "direction is not reset by a new column");
    }

    #[test]
    fn attribute_path_forces_ascending_without_touching_column_flag() {
        let mut store = store_with(&[("B", "x", "2001"), ("A", "y", "1999")]);
        let mut sorter = SortController::new();

        sorter.sort_by_column(&mut store, SortKey::Title);
        assert!(!sorter.next_column_ascending());

        let state = sorter.sort_by_attribute(&mut store, "Author").unwrap();
        assert_eq!(state, SortState::ascending(SortKey::Author));
        assert!(!sorter.next_column_ascending());

        let next = sorter.sort_by_column(&mut store, SortKey::Author);
        assert!(!next.ascending);
    }

    #[test]
    fn invalid_attribute_leaves_state_untouched() {
        let mut store = store_with(&[("B", "x", "2001"), ("A", "y", "1999")]);
        let mut sorter = SortController::new();
        sorter.sort_by_column(&mut store, SortKey::Title);
        let before = titles(&store);

        let err = sorter.sort_by_attribute(&mut store, "publisher").unwrap_err();

        assert_eq!(err, SortError::UnknownAttribute("publisher".to_string()));
        assert_eq!(store.sort(), Some(SortState::ascending(SortKey::Title)));
        assert_eq!(titles(&store), before);
    }

    #[test]
    fn nulls_lead_ascending_and_trail_descending() {
        let mut store = RecordStore::new();
        store.insert(Book::new("Middle", "", ""));
        store.add();
        store.insert(Book::new("Alpha", "", ""));

        store.set_sort(Some(SortState::ascending(SortKey::Title)));
        assert_eq!(
            titles(&store),
            vec![None, Some("Alpha".to_string()), Some("Middle".to_string())]
        );

        store.set_sort(Some(SortState {
            key: SortKey::Title,
            ascending: false,
        }));
        assert_eq!(
            titles(&store),
            vec![Some("Middle".to_string()), Some("Alpha".to_string()), None]
        );
    }

    #[test]
    fn comparison_is_case_sensitive_and_lexicographic() {
        let mut store = store_with(&[("b", "", "10"), ("B", "", "9"), ("a", "", "100")]);
        store.set_sort(Some(SortState::ascending(SortKey::Title)));
        assert_eq!(
            titles(&store),
            vec![
                Some("B".to_string()),
                Some("a".to_string()),
                Some("b".to_string())
            ]
        );

        store.set_sort(Some(SortState::ascending(SortKey::Year)));
        let years: Vec<_> = store.all().into_iter().map(|b| b.year.clone()).collect();
        assert_eq!(
            years,
            vec![
                Some("10".to_string()),
                Some("100".to_string()),
                Some("9".to_string())
            ]
        );
    }

    #[test]
    fn ties_keep_insertion_order_across_resorts() {
        let mut store = store_with(&[
            ("First", "Same", "1"),
            ("Second", "Same", "2"),
            ("Third", "Other", "3"),
            ("Fourth", "Same", "4"),
        ]);
        let mut sorter = SortController::new();

        for _ in 0..3 {
            sorter.sort_by_column(&mut store, SortKey::Year);
            sorter.sort_by_column(&mut store, SortKey::Title);
            sorter.sort_by_attribute(&mut store, "author").unwrap();
            let same: Vec<_> = store
                .all()
                .into_iter()
                .filter(|b| b.author.as_deref() == Some("Same"))
                .map(|b| b.title.clone().unwrap())
                .collect();
            assert_eq!(same, vec!["First", "Second", "Fourth"]);
        }

        store.set_sort(Some(SortState {
            key: SortKey::Author,
            ascending: false,
        }));
        let descending: Vec<_> = store
            .all()
            .into_iter()
            .map(|b| b.title.clone().unwrap())
            .collect();
        assert_eq!(descending, vec!["First", "Second", "Fourth", "Third"]);
    }
}
