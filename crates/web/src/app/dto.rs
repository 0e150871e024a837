use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use costs_core::Pagination;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AddExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effective_date: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub sub_category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseValidationError {
    #[error("description is required")]
    MissingDescription,
    #[error("effective date `{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("total `{0}` is not an amount")]
    InvalidTotal(String),
    #[error("category is required")]
    MissingCategory,
    #[error("sub category is required")]
    MissingSubCategory,
}

/// A validated expense, ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub effective_date: NaiveDate,
    /// Always two fractional digits.
    pub total: String,
    pub category_id: String,
    pub sub_category_id: String,
}

impl AddExpenseForm {
    pub fn validate(&self) -> Result<NewExpense, ExpenseValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ExpenseValidationError::MissingDescription);
        }

        let date = self.effective_date.trim();
        let effective_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ExpenseValidationError::InvalidDate(date.to_string()))?;

        let total = normalize_total(self.total.trim())
            .ok_or_else(|| ExpenseValidationError::InvalidTotal(self.total.trim().to_string()))?;

        let category_id = self.category_id.trim();
        if category_id.is_empty() {
            return Err(ExpenseValidationError::MissingCategory);
        }
        let sub_category_id = self.sub_category_id.trim();
        if sub_category_id.is_empty() {
            return Err(ExpenseValidationError::MissingSubCategory);
        }

        Ok(NewExpense {
            description: description.to_string(),
            effective_date,
            total,
            category_id: category_id.to_string(),
            sub_category_id: sub_category_id.to_string(),
        })
    }
}

impl NewExpense {
    pub fn item_payload(&self) -> Value {
        json!({
            "description": self.description,
            "effective_date": self.effective_date.format("%Y-%m-%d").to_string(),
            "total": self.total,
        })
    }

    pub fn category_payload(&self) -> Value {
        json!({ "category_id": self.category_id })
    }

    pub fn sub_category_payload(&self) -> Value {
        json!({ "sub_category_id": self.sub_category_id })
    }
}

/// `12`, `12.5` and `12.50` are all `12.50`; negatives, exponents and more
/// than two fractional digits are rejected.
fn normalize_total(raw: &str) -> Option<String> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    if whole.is_empty() || whole.len() > 10 || fraction.len() > 2 {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    Some(format!("{whole}.{fraction:0<2}"))
}

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExpensesQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl ExpensesQuery {
    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

// -------------------------
// View DTOs
// -------------------------

/// Page links for the expenses list, derived from the upstream pagination
/// headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub offset: u32,
    pub limit: u32,
    pub total: Option<u64>,
    pub count: Option<u64>,
    pub previous_offset: Option<u32>,
    pub next_offset: Option<u32>,
}

impl Pager {
    pub fn new(offset: u32, limit: u32, pagination: &Pagination) -> Self {
        let total = pagination.total_count();
        let count = pagination.count();

        let previous_offset = (offset > 0).then(|| offset.saturating_sub(limit));
        let next_offset = match total {
            Some(total) => (u64::from(offset) + u64::from(limit) < total)
                .then(|| offset.saturating_add(limit)),
            None => pagination.next().map(|_| offset.saturating_add(limit)),
        };

        Self {
            offset,
            limit,
            total,
            count,
            previous_offset,
            next_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn form(description: &str, date: &str, total: &str) -> AddExpenseForm {
        AddExpenseForm {
            description: description.into(),
            effective_date: date.into(),
            total: total.into(),
            category_id: "c1".into(),
            sub_category_id: "s1".into(),
        }
    }

    #[test]
    fn valid_form_normalizes_total() {
        let expense = form(" Nappies ", "2024-03-01", "12.5").validate().unwrap();
        assert_eq!(expense.description, "Nappies");
        assert_eq!(expense.total, "12.50");
        assert_eq!(
            expense.item_payload(),
            json!({"description": "Nappies", "effective_date": "2024-03-01", "total": "12.50"})
        );
    }

    #[test]
    fn totals() {
        assert_eq!(normalize_total("7").as_deref(), Some("7.00"));
        assert_eq!(normalize_total("007.1").as_deref(), Some("7.10"));
        assert_eq!(normalize_total("0.99").as_deref(), Some("0.99"));
        assert_eq!(normalize_total("1.999"), None);
        assert_eq!(normalize_total("-1"), None);
        assert_eq!(normalize_total("1e3"), None);
        assert_eq!(normalize_total(".5"), None);
        assert_eq!(normalize_total(""), None);
    }

    #[test]
    fn invalid_fields_are_reported() {
        assert_eq!(
            form("", "2024-03-01", "1").validate(),
            Err(ExpenseValidationError::MissingDescription)
        );
        assert_eq!(
            form("x", "01/03/2024", "1").validate(),
            Err(ExpenseValidationError::InvalidDate("01/03/2024".into()))
        );
        assert_eq!(
            form("x", "2024-02-30", "1").validate(),
            Err(ExpenseValidationError::InvalidDate("2024-02-30".into()))
        );

        let mut f = form("x", "2024-03-01", "1");
        f.sub_category_id = " ".into();
        assert_eq!(f.validate(), Err(ExpenseValidationError::MissingSubCategory));
    }

    #[test]
    fn page_size_is_clamped() {
        let q = ExpensesQuery {
            offset: None,
            limit: Some(10_000),
        };
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        let q = ExpensesQuery {
            offset: Some(5),
            limit: Some(0),
        };
        assert_eq!((q.offset(), q.limit()), (5, 1));
        let q = ExpensesQuery {
            offset: None,
            limit: None,
        };
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn pager_links_follow_total() {
        let headers = [("X-Total-Count", "60"), ("X-Count", "25")];
        let p = Pagination::from_lookup(|name| {
            headers
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        });

        let first = Pager::new(0, 25, &p);
        assert_eq!(first.previous_offset, None);
        assert_eq!(first.next_offset, Some(25));

        let last = Pager::new(50, 25, &p);
        assert_eq!(last.previous_offset, Some(25));
        assert_eq!(last.next_offset, None);
        assert_eq!(last.total, Some(60));
    }

    proptest! {
        #[test]
        fn normalized_totals_keep_their_value(
            whole in 0u32..1_000_000,
            cents in 0u32..100,
            short in any::<bool>()
        ) {
            let raw = if short && cents % 10 == 0 {
                format!("{whole}.{}", cents / 10)
            } else {
                format!("{whole}.{cents:02}")
            };
            prop_assert_eq!(normalize_total(&raw), Some(format!("{whole}.{cents:02}")));
        }
    }
}
