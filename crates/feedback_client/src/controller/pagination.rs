use std::{fmt, ops::Range, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::TwentyFive, PageSize::Hundred];

    pub fn rows(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Hundred => 100,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported page size {0}; expected 10, 25 or 100")]
pub struct UnsupportedPageSize(pub usize);

impl TryFrom<usize> for PageSize {
    type Error = UnsupportedPageSize;

    fn try_from(rows: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.rows() == rows)
            .ok_or(UnsupportedPageSize(rows))
    }
}

impl FromStr for PageSize {
    type Err = UnsupportedPageSize;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let rows = raw.trim().parse::<usize>().map_err(|_| UnsupportedPageSize(0))?;
        PageSize::try_from(rows)
    }
}

/// Local view over an in-memory collection; never triggers a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    page: usize,
    page_size: PageSize,
}

impl Pagination {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Pages past the end are allowed and simply show nothing.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 0;
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size.rows())
    }

    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let rows = self.page_size.rows();
        let start = self.page.saturating_mul(rows).min(len);
        let end = start.saturating_add(rows).min(len);
        start..end
    }

    pub fn visible_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.visible_range(items.len())]
    }
}
