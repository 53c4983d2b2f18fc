/// Page size used when a caller asks for a size of zero.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Sort direction for an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A single ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn new(field: impl Into<String>, direction: Direction) -> Order {
        Order {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Order {
        Order::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Order {
        Order::new(field, Direction::Desc)
    }
}

/// A page request: zero-based page number, page size, and sort order.
///
/// A size of zero is normalized to [`DEFAULT_PAGE_SIZE`] so a page can never
/// select nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: u64,
    size: u64,
    orders: Vec<Order>,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Page {
        Page {
            number,
            size: normalize_size(size),
            orders: vec![],
        }
    }

    /// Adds an ORDER BY term, returning the page for chaining.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Page {
        self.orders.push(Order::new(field, direction));
        self
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.number * self.size
    }

    /// Offset one past the last row on this page.
    pub fn end(&self) -> u64 {
        self.offset() + self.size
    }
}

/// One page of results plus the bookkeeping to page through the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    page: u64,
    page_size: u64,
    total: u64,
    items: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn new(page: u64, page_size: u64, total: u64, items: Vec<T>) -> PageResult<T> {
        PageResult {
            page,
            page_size: normalize_size(page_size),
            total,
            items,
        }
    }

    /// Wraps a complete result set as a single page.
    pub fn unpaged(items: Vec<T>) -> PageResult<T> {
        let total = items.len() as u64;
        PageResult::new(0, total, total, items)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total number of matching rows across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size)
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    /// Whether this is the last page. An empty result is both first and last.
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages().saturating_sub(1)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for PageResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

fn normalize_size(size: u64) -> u64 {
    if size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        size
    }
}
