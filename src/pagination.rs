use serde::{Deserialize, Deserializer, Serialize};

/// `?page=` query parameter.
///
/// Kept as a raw string so that junk like `?page=abc` falls back to the first
/// page instead of rejecting the request. A repeated `page` keeps the last
/// value.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl<'de> Deserialize<'de> for PageQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(String, String)>::deserialize(deserializer)?;
        let page = pairs
            .into_iter()
            .rev()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value);
        Ok(PageQuery { page })
    }
}

impl PageQuery {
    pub fn number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|n| n.max(1) as usize)
            .unwrap_or(1)
    }
}

/// One page out of an ordered listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based number of this page, always within `1..=num_pages`.
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Cuts page `requested` out of `records`. Numbers past the end clamp to
    /// the last page; an empty listing still has one (empty) page.
    pub fn new(records: Vec<T>, requested: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total = records.len();
        let num_pages = total.div_ceil(per_page).max(1);
        let number = requested.clamp(1, num_pages);

        let start = (number - 1) * per_page;
        let items = records.into_iter().skip(start).take(per_page).collect();

        Self {
            items,
            number,
            num_pages,
            total,
            per_page,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> usize {
        (self.number + 1).min(self.num_pages)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}
