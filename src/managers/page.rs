pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Page is floored at 0, size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn clamped(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).max(0).min(i64::from(u32::MAX));
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE).max(1).min(MAX_PAGE_SIZE);
        Self {
            page: page as u32,
            size: size as u32,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Slices an already ordered result set.
    pub fn from_ordered(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len() as u64;
        let content = items
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .collect();
        Self {
            content,
            request,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.request.size);
        (self.total_elements + size - 1) / size
    }

    pub fn is_first(&self) -> bool {
        self.request.page == 0
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.request.page) + 1 >= self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }
}
