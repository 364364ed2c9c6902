use serde::Serialize;

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Number of records across all pages.
    pub total_items: usize,
    /// Number of pages; zero for an empty list.
    pub total_pages: usize,
    /// 1-based number of this page.
    pub current_page: usize,
    /// Page size used.
    pub per_page: usize,
}

/// Cut page `page` of `per_page` records out of `items`.
///
/// Pages are 1-based and page 0 is read as page 1. A `per_page` of 0 is
/// read as 1. Pages past the end are empty but still report the totals.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Page {
        items,
        total_items,
        total_pages,
        current_page: page,
        per_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_first_page() {
        let page = paginate(numbers(25), 1, 10);
        assert_eq!(page.items, numbers(10));
        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_last_partial_page() {
        let page = paginate(numbers(25), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_exact_multiple() {
        let page = paginate(numbers(20), 2, 10);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate(numbers(5), 4, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 4);
    }

    #[test]
    fn test_page_zero_reads_as_first() {
        let page = paginate(numbers(5), 0, 2);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items, vec![1, 2]);
    }

    #[test]
    fn test_empty_list() {
        let page = paginate(Vec::<usize>::new(), 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(numbers(3), usize::MAX, 10);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(paginate(numbers(3), 1, 2)).unwrap();
        assert_eq!(json["totalItems"], 3);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["perPage"], 2);
    }
}
