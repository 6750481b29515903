//! Paging and sorting for listings.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Listing request: filters plus the page to return.
///
/// Pages are 1-based; `page(0)` is read as the first page. A missing
/// `per_page` falls back to the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams<F> {
    pub filters: F,
    pub page: u32,
    pub per_page: Option<u32>,
    pub sort_dir: SortDirection,
}

impl<F: Default> Default for SearchParams<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F> SearchParams<F> {
    pub fn new(filters: F) -> Self {
        Self {
            filters,
            page: 1,
            per_page: None,
            sort_dir: SortDirection::Asc,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sorted(mut self, dir: SortDirection) -> Self {
        self.sort_dir = dir;
        self
    }

    /// Fill in `per_page` when the caller left it out.
    pub fn with_default_per_page(mut self, per_page: u32) -> Self {
        self.per_page.get_or_insert(per_page);
        self
    }

    pub fn effective_per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> SearchResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        SearchResult {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Cut the page described by `params` out of already filtered and sorted
/// `items`.
pub fn paginate<T, F>(items: Vec<T>, params: &SearchParams<F>) -> SearchResult<T> {
    let page = params.effective_page();
    let per_page = params.effective_per_page();
    let total = items.len();
    let total_pages = total.div_ceil(per_page as usize) as u32;

    let skip = (page as usize - 1).saturating_mul(per_page as usize);
    let data = items
        .into_iter()
        .skip(skip)
        .take(per_page as usize)
        .collect();

    SearchResult {
        data,
        meta: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let params = SearchParams::new(());
        let result = paginate((0..45).collect::<Vec<_>>(), &params);

        assert_eq!(result.data, (0..20).collect::<Vec<_>>());
        assert_eq!(
            result.meta,
            PaginationMeta {
                page: 1,
                per_page: 20,
                total: 45,
                total_pages: 3,
            }
        );
    }

    #[test]
    fn last_page_is_partial_and_pages_past_the_end_are_empty() {
        let items: Vec<u32> = (0..45).collect();

        let last = paginate(items.clone(), &SearchParams::new(()).page(3));
        assert_eq!(last.data, (40..45).collect::<Vec<_>>());

        let past = paginate(items, &SearchParams::new(()).page(9));
        assert!(past.data.is_empty());
        assert_eq!(past.meta.total_pages, 3);
    }

    #[test]
    fn page_zero_means_first_page() {
        let params = SearchParams::new(()).page(0);
        assert_eq!(params.effective_page(), 1);
    }

    #[test]
    fn configured_default_only_fills_gaps() {
        let explicit = SearchParams::new(()).per_page(5).with_default_per_page(50);
        assert_eq!(explicit.effective_per_page(), 5);

        let implicit = SearchParams::new(()).with_default_per_page(50);
        assert_eq!(implicit.effective_per_page(), 50);

        let huge = SearchParams::new(()).per_page(10_000);
        assert_eq!(huge.effective_per_page(), MAX_PAGE_SIZE);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: walking every page yields each item exactly once, in order.
        #[test]
        fn pages_partition_the_items(len in 0usize..300, per_page in 1u32..40) {
            let items: Vec<usize> = (0..len).collect();
            let first = paginate(items.clone(), &SearchParams::new(()).per_page(per_page));

            let mut seen = Vec::new();
            for page in 1..=first.meta.total_pages {
                let params = SearchParams::new(()).per_page(per_page).page(page);
                seen.extend(paginate(items.clone(), &params).data);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
