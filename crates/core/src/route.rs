use std::fmt;

/// A page the web front end can redirect to.
///
/// Redirect targets are expressed as routes rather than raw paths so the
/// gateway and controllers can never point a user at a URL the router does
/// not serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    SignIn,
    /// Generic error page, the default exception target.
    Error,
    Recent,
    AddExpense,
    Expense(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Index => "/".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::Error => "/error".to_string(),
            Route::Recent => "/recent".to_string(),
            Route::AddExpense => "/add-expense".to_string(),
            Route::Expense(id) => format!("/expense/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Upstream identifiers are short opaque hashes; anything else is rejected
/// before it is spliced into an upstream URI or a redirect path.
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameterised_routes_embed_identifier() {
        assert_eq!(Route::Expense("d185Q15grY".into()).path(), "/expense/d185Q15grY");
        assert_eq!(Route::AddExpense.to_string(), "/add-expense");
    }

    #[test]
    fn identifiers_reject_path_characters() {
        assert!(is_valid_identifier("nR0AEwaZ9b"));
        assert!(is_valid_identifier("2019"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("../items"));
        assert!(!is_valid_identifier("a/b"));
        assert!(!is_valid_identifier("a?b=c"));
    }
}
