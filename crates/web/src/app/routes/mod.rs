use axum::{Router, routing::get};

pub mod authentication;
pub mod common;
pub mod expenses;
pub mod summaries;
pub mod system;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(authentication::index))
        .route(
            "/sign-in",
            get(authentication::sign_in).post(authentication::process_sign_in),
        )
        .route("/sign-out", get(authentication::sign_out))
        .route("/error", get(system::error))
        .route("/health", get(system::health))
}

/// Routes behind the session gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/recent", get(expenses::recent))
        .route("/expenses", get(expenses::expenses))
        .route("/expense/:id", get(expenses::expense))
        .route(
            "/add-expense",
            get(expenses::add_expense).post(expenses::process_add_expense),
        )
        .route("/sub-categories/:id", get(expenses::sub_categories))
        .route(
            "/delete-expense/:id",
            get(expenses::delete_expense).post(expenses::process_delete_expense),
        )
        .route("/summaries", get(summaries::summaries))
        .route(
            "/sub-categories-summary/:id",
            get(summaries::sub_categories_summary),
        )
        .route("/tco-summary", get(summaries::tco_summary))
        .route("/months-summary/:id", get(summaries::months_summary))
        .route("/version-history", get(system::version_history))
}
