//! Shared persistence model types

use serde::{Deserialize, Serialize};

/// Paginated result set returned by list endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            page_number: 1,
            pages_available: 0,
            page_items: vec![],
        }
    }
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                (total_count as f64 / page_size as f64).ceil() as u64
            } else {
                0
            },
            page_items,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            page_number: self.page_number,
            pages_available: self.pages_available,
            page_items: self.page_items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new_rounds_up() {
        let page = Page::<u32>::new(11, 1, 5, vec![]);
        assert_eq!(page.pages_available, 3);
    }

    #[test]
    fn test_page_zero_page_size() {
        let page = Page::<u32>::new(11, 1, 0, vec![]);
        assert_eq!(page.pages_available, 0);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(2, 1, 10, vec![1u32, 2u32]);
        let mapped = page.map(|v| v.to_string());
        assert_eq!(mapped.page_items, vec!["1", "2"]);
        assert_eq!(mapped.total_count, 2);
    }
}
