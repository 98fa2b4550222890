//! Page count and per-page slot assignment for fillable layouts.

use crate::icon::PageDirection;
use crate::layout::Layout;
use crate::types::Slot;
use std::ops::Range;

/// Number of pages needed for `fillers` items at `per_page` items per page.
///
/// Always at least one page; a layout without capacity renders a single page.
pub fn page_count(fillers: usize, per_page: usize) -> usize {
    if fillers == 0 || per_page == 0 {
        1
    } else {
        fillers.div_ceil(per_page)
    }
}

/// Whether a page switcher is suppressed on `page`.
pub fn is_hidden(direction: PageDirection, page: usize, page_count: usize) -> bool {
    match direction {
        PageDirection::Previous => page == 0,
        PageDirection::Next => page + 1 >= page_count,
    }
}

/// The result of paginating a filler list against one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    pub page_count: usize,
    pub per_page: usize,
    /// Filler index range shown on each page.
    pub buckets: Vec<Range<usize>>,
    free_slots: Vec<Slot>,
}

impl PagePlan {
    pub fn new(layout: &Layout, fillers: usize) -> Self {
        let per_page = layout.per_page();
        let page_count = page_count(fillers, per_page);
        let buckets = (0..page_count)
            .map(|page| {
                let start = (page * per_page).min(fillers);
                let end = (start + per_page).min(fillers);
                start..end
            })
            .collect();

        Self {
            page_count,
            per_page,
            buckets,
            free_slots: layout.free_slots(),
        }
    }

    /// `(slot, filler index)` pairs for `page`, in fill-range scan order.
    pub fn assignments(&self, page: usize) -> Vec<(Slot, usize)> {
        match self.buckets.get(page) {
            Some(bucket) => self.free_slots.iter().copied().zip(bucket.clone()).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{Icon, Visual, NEXT_PAGE, PREVIOUS_PAGE};
    use crate::layout::LayoutBuilder;

    fn layout() -> Layout {
        LayoutBuilder::new("bans", 6)
            .title("en", "Bans")
            .icon(Icon::new(PREVIOUS_PAGE, 45, Visual::new("ARROW")))
            .icon(Icon::new(NEXT_PAGE, 53, Visual::new("ARROW")))
            .icon(Icon::new("deco-a", 9, Visual::new("GLASS")))
            .icon(Icon::new("deco-b", 44, Visual::new("GLASS")))
            .fill(9, 44, Icon::new("empty", 22, Visual::new("BARRIER")))
            .template("ban", Icon::new("ban", 0, Visual::new("PAPER")))
            .build("en")
            .unwrap()
    }

    #[test]
    fn test_page_count_property() {
        for per_page in 1..40 {
            for fillers in 0..200 {
                let expected = if fillers == 0 {
                    1
                } else {
                    (fillers as f64 / per_page as f64).ceil() as usize
                };
                assert_eq!(page_count(fillers, per_page), expected, "n={fillers} p={per_page}");
            }
        }
    }

    #[test]
    fn test_zero_capacity_is_single_page() {
        assert_eq!(page_count(10, 0), 1);
    }

    #[test]
    fn test_bucket_sizes() {
        let plan = PagePlan::new(&layout(), 100);
        assert_eq!(plan.per_page, 34);
        assert_eq!(plan.page_count, 3);
        let sizes: Vec<usize> = plan.buckets.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![34, 34, 32]);

        let layout = layout();
        for fillers in 1..150 {
            let plan = PagePlan::new(&layout, fillers);
            let last = plan.page_count - 1;
            for page in 0..last {
                assert_eq!(plan.assignments(page).len(), 34);
            }
            assert_eq!(plan.assignments(last).len(), fillers - 34 * last);
        }
    }

    #[test]
    fn test_assignments_skip_static_slots() {
        let plan = PagePlan::new(&layout(), 40);
        let first = plan.assignments(0);
        assert_eq!(first[0], (10, 0));
        assert!(first.iter().all(|(slot, _)| *slot != 9 && *slot != 44));
        assert_eq!(first.last(), Some(&(43, 33)));

        let second = plan.assignments(1);
        assert_eq!(second, (10..16).zip(34..40).collect::<Vec<_>>());
        assert!(plan.assignments(2).is_empty());
    }

    #[test]
    fn test_hidden_switchers() {
        for page_count in 1..6 {
            for page in 0..page_count {
                assert_eq!(is_hidden(PageDirection::Previous, page, page_count), page == 0);
                assert_eq!(is_hidden(PageDirection::Next, page, page_count), page == page_count - 1);
            }
        }
    }
}
