//! Upstream URIs, relative to the configured API base URL.

/// Page size used for the recent-items list.
pub const RECENT_LIMIT: u32 = 25;

/// Upstream paths for one tracked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    resource_type_id: String,
    resource_id: String,
    sign_in: String,
}

impl Endpoints {
    pub fn new(
        resource_type_id: impl Into<String>,
        resource_id: impl Into<String>,
        sign_in: impl Into<String>,
    ) -> Self {
        Self {
            resource_type_id: resource_type_id.into(),
            resource_id: resource_id.into(),
            sign_in: sign_in.into(),
        }
    }

    pub fn sign_in(&self) -> &str {
        &self.sign_in
    }

    pub fn changelog(&self) -> &'static str {
        "changelog"
    }

    pub fn resource(&self) -> String {
        format!(
            "resource_types/{}/resources/{}",
            self.resource_type_id, self.resource_id
        )
    }

    pub fn recent_items(&self) -> String {
        format!("{}/items?limit={RECENT_LIMIT}", self.resource())
    }

    pub fn items_collection(&self) -> String {
        format!("{}/items", self.resource())
    }

    pub fn items(&self, offset: u32, limit: u32) -> String {
        format!("{}/items?offset={offset}&limit={limit}", self.resource())
    }

    pub fn item(&self, item_id: &str) -> String {
        format!("{}/items/{item_id}", self.resource())
    }

    pub fn item_category(&self, item_id: &str) -> String {
        format!("{}/category", self.item(item_id))
    }

    pub fn item_sub_category(&self, item_id: &str, item_category_id: &str) -> String {
        format!(
            "{}/{item_category_id}/sub_category",
            self.item_category(item_id)
        )
    }

    pub fn categories(&self) -> String {
        format!("categories?resource_type={}", self.resource_type_id)
    }

    pub fn category(&self, category_id: &str) -> String {
        format!("categories/{category_id}")
    }

    pub fn sub_categories(&self, category_id: &str) -> String {
        format!("{}/sub_categories", self.category(category_id))
    }

    fn summary(&self) -> String {
        format!("summary/{}", self.resource())
    }

    pub fn categories_summary(&self) -> String {
        format!("{}/categories", self.summary())
    }

    pub fn sub_categories_summary(&self, category_id: &str) -> String {
        format!("{}/categories/{category_id}/sub_categories", self.summary())
    }

    pub fn years_summary(&self) -> String {
        format!("{}/years", self.summary())
    }

    pub fn months_summary(&self, year: &str) -> String {
        format!("{}/years/{year}/months", self.summary())
    }

    pub fn tco_summary(&self) -> String {
        format!("{}/items", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("d185Q15grY", "kw8gLq31VB", "auth/login")
    }

    #[test]
    fn item_paths_nest_under_the_resource() {
        let e = endpoints();
        assert_eq!(e.resource(), "resource_types/d185Q15grY/resources/kw8gLq31VB");
        assert_eq!(
            e.item_sub_category("it1", "ic1"),
            "resource_types/d185Q15grY/resources/kw8gLq31VB/items/it1/category/ic1/sub_category"
        );
        assert_eq!(
            e.items(50, 25),
            "resource_types/d185Q15grY/resources/kw8gLq31VB/items?offset=50&limit=25"
        );
    }

    #[test]
    fn summary_paths_are_prefixed() {
        let e = endpoints();
        assert_eq!(
            e.months_summary("2018"),
            "summary/resource_types/d185Q15grY/resources/kw8gLq31VB/years/2018/months"
        );
        assert_eq!(e.sub_categories("c1"), "categories/c1/sub_categories");
    }
}
