use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::models::SortKey;
use crate::store::SortState;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Cursor column after `prefix` label characters and `len` typed characters,
/// kept inside `inner` however long the input grows.
pub(crate) fn cursor_column(inner: Rect, prefix: usize, len: usize) -> u16 {
    let offset = u16::try_from(prefix.saturating_add(len)).unwrap_or(u16::MAX);
    inner
        .x
        .saturating_add(offset)
        .min(inner.right().saturating_sub(1))
}

/// Column header with an arrow on the actively sorted column.
pub(crate) fn column_heading(key: SortKey, sort: Option<SortState>) -> String {
    match sort {
        Some(state) if state.key == key => {
            format!("{} {}", key.heading(), direction_arrow(state.ascending))
        }
        _ => key.heading().to_string(),
    }
}

pub(crate) fn direction_arrow(ascending: bool) -> &'static str {
    if ascending {
        "▲"
    } else {
        "▼"
    }
}

pub(crate) fn direction_word(ascending: bool) -> &'static str {
    if ascending {
        "ascending"
    } else {
        "descending"
    }
}

/// Table cell text for an optional field.
pub(crate) fn cell_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Bracketed key hint for the footer.
pub(crate) fn key_hint(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}
