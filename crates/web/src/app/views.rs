//! Named page templates, compiled into the binary.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use super::errors::WebError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("status.html", include_str!("../../templates/status.html")),
    ("sign-in.html", include_str!("../../templates/sign-in.html")),
    ("recent.html", include_str!("../../templates/recent.html")),
    ("summaries.html", include_str!("../../templates/summaries.html")),
    (
        "sub-categories-summary.html",
        include_str!("../../templates/sub-categories-summary.html"),
    ),
    ("months-summary.html", include_str!("../../templates/months-summary.html")),
    ("tco-summary.html", include_str!("../../templates/tco-summary.html")),
    ("add-expense.html", include_str!("../../templates/add-expense.html")),
    ("sub-categories.html", include_str!("../../templates/sub-categories.html")),
    ("expense.html", include_str!("../../templates/expense.html")),
    ("delete-expense.html", include_str!("../../templates/delete-expense.html")),
    ("version-history.html", include_str!("../../templates/version-history.html")),
    ("expenses.html", include_str!("../../templates/expenses.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Compile every template up front so a syntax error fails startup, not
    /// the first request that needs the page.
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `name` (without the `.html` suffix).
    pub fn render<C: Serialize>(&self, name: &str, ctx: C) -> Result<Html<String>, WebError> {
        let template = self.env.get_template(&format!("{name}.html"))?;
        Ok(Html(template.render(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use minijinja::context;
    use serde_json::json;

    use super::*;

    #[test]
    fn all_templates_compile() {
        Views::load().unwrap();
    }

    #[test]
    fn sign_in_shows_resource_and_status() {
        let views = Views::load().unwrap();
        let Html(body) = views
            .render("sign-in", context! { resource => "Jack", status => "sign-in-failed" })
            .unwrap();
        assert!(body.contains("Costs to Expect - Jack"));
        assert!(body.contains("could not sign you in"));
    }

    #[test]
    fn upstream_text_is_escaped() {
        let views = Views::load().unwrap();
        let items = json!([{
            "id": "a1",
            "description": "<script>",
            "total": "1.00",
            "effective_date": "2024-01-01"
        }]);
        let Html(body) = views.render("recent", context! { items }).unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn unknown_view_is_an_error() {
        let views = Views::load().unwrap();
        assert!(matches!(views.render("nope", context! {}), Err(WebError::Render(_))));
    }
}
