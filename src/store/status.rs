//! Record counter text and the binder that keeps it current.

use std::cell::RefCell;
use std::rc::Rc;

use super::notify::{ChangeNotifier, Subscription};
use super::selection::Selection;

pub const NO_RECORDS: &str = "No Records";
pub const NO_SELECTION: &str = "No Selection";

/// Text for the record counter: empty catalog, nothing selected, or the
/// one-based position of the selection.
pub fn status_label(count: usize, selection: Selection) -> String {
    if count == 0 {
        return NO_RECORDS.to_string();
    }
    match selection {
        Selection::None => NO_SELECTION.to_string(),
        Selection::At(index) => format!("Record {} of {}", index + 1, count),
    }
}

/// Keeps the record counter text in sync with the catalog. The label is
/// recomputed on every published change and stops updating once the binder
/// is dropped.
pub struct StatusLabelBinder {
    text: Rc<RefCell<String>>,
    _subscription: Subscription,
}

impl StatusLabelBinder {
    /// Start observing `notifier`, seeding the label from the current state.
    pub fn attach(notifier: &ChangeNotifier, count: usize, selection: Selection) -> Self {
        let text = Rc::new(RefCell::new(status_label(count, selection)));
        let sink = Rc::clone(&text);
        let subscription = notifier.subscribe(move |change| {
            *sink.borrow_mut() = status_label(change.count, change.selection);
        });
        Self {
            text,
            _subscription: subscription,
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogChange, ChangeKind};

    #[test]
    fn label_follows_three_way_rule() {
        for count in 0..5 {
            assert_eq!(
                status_label(count, Selection::None),
                if count == 0 { NO_RECORDS } else { NO_SELECTION }
            );
            for index in 0..count {
                assert_eq!(
                    status_label(count, Selection::At(index)),
                    format!("Record {} of {}", index + 1, count)
                );
            }
        }
        assert_eq!(status_label(0, Selection::At(0)), NO_RECORDS);
    }

    #[test]
    fn binder_updates_on_publish_and_stops_after_drop() {
        let notifier = ChangeNotifier::new();
        let binder = StatusLabelBinder::attach(&notifier, 0, Selection::None);
        assert_eq!(binder.text(), NO_RECORDS);

        notifier.publish(&CatalogChange {
            kind: ChangeKind::Selection,
            count: 3,
            selection: Selection::At(1),
        });
        assert_eq!(binder.text(), "Record 2 of 3");

        drop(binder);
        assert_eq!(notifier.listener_count(), 0);
    }
}
