use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Id of the last item in the page; feed it back as the next cursor.
    pub next_cursor: Option<String>,
    pub limit: u32,
    /// Exact when the store over-fetched by one item.
    pub has_more: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> ResultPage<T> {
    /// Create a new page with items and page info
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map items while preserving page_info (raw->domain mapping convenience)
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> ResultPage<U> {
        ResultPage {
            items: self.items.into_iter().map(&mut f).collect(),
            page_info: self.page_info,
        }
    }

    /// Fallible variant of [`ResultPage::map_items`].
    pub fn try_map_items<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<ResultPage<U>, E> {
        let items = self
            .items
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResultPage {
            items,
            page_info: self.page_info,
        })
    }
}
