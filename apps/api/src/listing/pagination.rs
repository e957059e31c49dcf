//! Pagination windower: page counts, clamping, slicing and page buttons.

use serde::Serialize;

/// Pages shown on either side of the current page in the button row.
const BUTTON_RADIUS: usize = 2;

/// Number of pages for `item_count` items. Never less than 1, so an empty
/// result still has a (blank) first page.
pub fn total_pages(item_count: usize, per_page: usize) -> usize {
    item_count.div_ceil(per_page.max(1)).max(1)
}

/// Clamps a requested page into `[1, total_pages]`. Takes a signed value so
/// zero and negative requests from the URL land on page 1.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let last = total_pages.max(1);
    if requested < 1 {
        1
    } else {
        usize::try_from(requested).map_or(last, |p| p.min(last))
    }
}

/// One page of a larger slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub page_items: &'a [T],
    pub total_pages: usize,
    /// The clamped page actually returned.
    pub page: usize,
    /// Offset of the first item on this page.
    pub start_index: usize,
    /// Offset one past the last item on this page.
    pub end_index: usize,
}

pub fn paginate<T>(items: &[T], page: i64, per_page: usize) -> PageSlice<'_, T> {
    let per_page = per_page.max(1);
    let total = total_pages(items.len(), per_page);
    let page = clamp_page(page, total);
    let start = ((page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    PageSlice {
        page_items: &items[start..end],
        total_pages: total,
        page,
        start_index: start,
        end_index: end,
    }
}

/// An entry in the rendered page-number row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageButton {
    Page { number: usize },
    Ellipsis,
}

/// Page-number row: the first page, the last page, and every page within two
/// of the current one. Each run of hidden pages collapses into one ellipsis.
pub fn page_buttons(total_pages: usize, current: usize) -> Vec<PageButton> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    let lo = current.saturating_sub(BUTTON_RADIUS).max(1);
    let hi = (current + BUTTON_RADIUS).min(total);

    let mut buttons = Vec::new();
    let mut last_shown = 0;
    for number in [1]
        .into_iter()
        .chain(lo..=hi)
        .chain([total])
    {
        if number <= last_shown {
            continue;
        }
        if number > last_shown + 1 && last_shown > 0 {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page { number });
        last_shown = number;
    }
    buttons
}
