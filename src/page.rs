//! Cursor-style pagination for listing operations.
//!
//! A cursor is the id of the last record the caller has seen. Listings
//! resume from ids strictly greater than it, so pages stay stable while
//! records are inserted or deleted behind the caller's back.

use serde::Serialize;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: usize,
    /// Id to resume from. Present only when more records remain.
    pub next_cursor: Option<u64>,
}

/// Slice `items` (assumed sorted by ascending id) down to one page.
pub fn paginate<T, F>(items: Vec<T>, limit: usize, cursor: Option<u64>, id_of: F) -> Page<T>
where
    F: Fn(&T) -> u64,
{
    let filtered: Vec<T> = match cursor {
        Some(cursor) => items.into_iter().filter(|t| id_of(t) > cursor).collect(),
        None => items,
    };
    let has_more = filtered.len() > limit;
    let items: Vec<T> = filtered.into_iter().take(limit).collect();
    let next_cursor = if has_more {
        items.last().map(&id_of)
    } else {
        None
    };
    Page {
        items,
        limit,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_limit_and_reports_next_cursor() {
        let page = paginate(vec![1u64, 2, 3, 4, 5], 2, None, |&id| id);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.next_cursor, Some(2));
    }

    #[test]
    fn resumes_strictly_after_cursor() {
        let page = paginate(vec![1u64, 2, 3, 4, 5], 2, Some(2), |&id| id);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.next_cursor, Some(4));
    }

    #[test]
    fn no_next_cursor_on_final_page() {
        let page = paginate(vec![1u64, 2, 3], 5, None, |&id| id);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.next_cursor, None);

        let page = paginate(vec![1u64, 2, 3], 3, None, |&id| id);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn empty_input_yields_empty_page() {
        let page = paginate(Vec::<u64>::new(), 10, Some(7), |&id| id);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
