use serde::{Deserialize, Serialize};

/// One page of a newest-first listing. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    number: usize,
    total_pages: usize,
    items: Vec<T>,
}

impl<T> Page<T>
where
    T: Clone,
{
    /// Takes page `number` of `oldest_first` after reversing it, so that the most recently added
    /// item is the first item of page 1.
    ///
    /// A `number` of zero, a `number` past the last page, or a `page_size` of zero produce an empty
    /// page rather than an error.
    pub fn of(oldest_first: &[T], number: usize, page_size: usize) -> Self {
        let total_pages = total_pages(oldest_first.len(), page_size);
        if number == 0 || number > total_pages {
            return Self {
                number,
                total_pages,
                items: Vec::new(),
            };
        }
        let items = oldest_first
            .iter()
            .rev()
            .skip((number - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();
        Self {
            number,
            total_pages,
            items,
        }
    }
}

impl<T> Page<T> {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1 && self.number <= self.total_pages
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// The number of pages needed to show `len` items, `page_size` at a time.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_is_newest() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Page::of(&items, 1, 10);
        assert_eq!(page.items(), &(16..=25).rev().collect::<Vec<_>>()[..]);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_pages_reconstruct_the_list() {
        for len in 0..=23 {
            for size in 1..=7 {
                let items: Vec<usize> = (0..len).collect();
                let mut joined = Vec::new();
                for n in 1..=total_pages(len, size) {
                    let page = Page::of(&items, n, size);
                    assert!(!page.is_empty());
                    joined.extend(page.into_items());
                }
                let expected: Vec<usize> = items.iter().rev().copied().collect();
                assert_eq!(joined, expected, "len {len} size {size}");
                assert!(Page::of(&items, total_pages(len, size) + 1, size).is_empty());
            }
        }
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let items = vec!["a", "b", "c"];
        assert!(Page::of(&items, 0, 2).is_empty());
        assert!(Page::of(&items, 3, 2).is_empty());
        assert!(Page::of(&items, 1, 0).is_empty());
        let last = Page::of(&items, 2, 2);
        assert_eq!(last.items(), &["a"]);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }
}
