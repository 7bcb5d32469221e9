use serde::{Deserialize, Serialize};

/// A page of items from a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    /// Whether another page exists after this one.
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < self.total
    }
}

/// `?page=&limit=` query parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_on_partial_pages() {
        let page = Paginated::<u8> {
            items: vec![],
            total: 25,
            page: 2,
            limit: 10,
        };
        assert!(page.has_more());

        let last = Paginated::<u8> { page: 3, ..page };
        assert!(!last.has_more());
    }
}
