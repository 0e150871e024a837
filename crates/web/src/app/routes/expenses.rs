use std::sync::Arc;

use axum::{
    Form,
    extract::{Extension, Path, Query},
    response::{Html, Response},
};
use minijinja::context;
use serde_json::Value;

use costs_auth::BearerToken;
use costs_core::Route;
use costs_infra::{API_ERROR_STATUS, FlashMessage, Halt, RedirectTo};

use crate::app::{
    AppState, WebError,
    dto::{AddExpenseForm, ExpensesQuery, Pager},
};
use crate::context::WebSession;

use super::common::{check_id, gateway, redirect_with_status, take_status};

pub const VALIDATION_ERROR: &str = "validation-error";
pub const EXPENSE_ADDED: &str = "expense-added";
pub const EXPENSE_NOT_ADDED: &str = "expense-not-added";
pub const EXPENSE_NOT_CATEGORISED: &str = "expense-not-categorised";
pub const EXPENSE_DELETED: &str = "expense-deleted";

pub async fn recent(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    session: WebSession,
) -> Result<Html<String>, WebError> {
    let gw = gateway(&state, &token)?;
    let items = gw.get(&state.endpoints.recent_items()).await?;
    let status = take_status(&session).await?;

    state.views.render("recent", context! { items, status })
}

pub async fn expenses(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Html<String>, WebError> {
    let (offset, limit) = (query.offset(), query.limit());
    let gw = gateway(&state, &token)?;
    let uri = state.endpoints.items(offset, limit);

    let pagination = gw.head(&uri).await?;
    let items = gw.get(&uri).await?;
    let pager = Pager::new(offset, limit, &pagination);

    state.views.render("expenses", context! { items, pagination, pager })
}

pub async fn expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    session: WebSession,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = check_id(id)?;
    let gw = gateway(&state, &token)?;
    let item = gw.get(&state.endpoints.item(&id)).await?;
    let status = take_status(&session).await?;

    state.views.render("expense", context! { item, status })
}

pub async fn add_expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    session: WebSession,
) -> Result<Html<String>, WebError> {
    let gw = gateway(&state, &token)?;
    let categories = gw.get(&state.endpoints.categories()).await?;
    let status = take_status(&session).await?;

    state.views.render("add-expense", context! { categories, status })
}

/// Create the item, then assign its category and sub category.
///
/// Any upstream refusal sends the user back to the form with a status
/// message; the item may already exist at that point.
pub async fn process_add_expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Form(form): Form<AddExpenseForm>,
) -> Result<Response, WebError> {
    let expense = form.validate().map_err(|e| {
        tracing::info!("add expense rejected: {e}");
        WebError::Invalid {
            back: Route::AddExpense,
            status: VALIDATION_ERROR,
        }
    })?;

    let gw = gateway(&state, &token)?.redirect_on_failure(Route::AddExpense);
    let e = &state.endpoints;

    let item = gw
        .post(&e.items_collection(), &expense.item_payload(), EXPENSE_NOT_ADDED)
        .await?;
    let item_id = created_id(&item)?;

    let category = gw
        .post(
            &e.item_category(&item_id),
            &expense.category_payload(),
            EXPENSE_NOT_CATEGORISED,
        )
        .await?;
    let item_category_id = created_id(&category)?;

    gw.post(
        &e.item_sub_category(&item_id, &item_category_id),
        &expense.sub_category_payload(),
        EXPENSE_NOT_CATEGORISED,
    )
    .await?;

    tracing::info!(item_id = %item_id, "expense added");
    Ok(redirect_with_status(Route::Recent, EXPENSE_ADDED))
}

pub async fn sub_categories(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let category_id = check_id(id)?;
    let gw = gateway(&state, &token)?;
    let sub_categories = gw.get(&state.endpoints.sub_categories(&category_id)).await?;

    state.views.render("sub-categories", context! { sub_categories })
}

pub async fn delete_expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = check_id(id)?;
    let gw = gateway(&state, &token)?;
    let item = gw.get(&state.endpoints.item(&id)).await?;

    state.views.render("delete-expense", context! { item })
}

pub async fn process_delete_expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id = check_id(id)?;
    let gw = gateway(&state, &token)?.redirect_on_failure(Route::Expense(id.clone()));

    gw.delete(&state.endpoints.item(&id)).await?;

    tracing::info!(item_id = %id, "expense deleted");
    Ok(redirect_with_status(Route::Recent, EXPENSE_DELETED))
}

/// The `id` of a freshly created upstream record.
fn created_id(body: &Value) -> Result<String, WebError> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| costs_core::is_valid_identifier(id))
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::error!("upstream created a record without a usable id");
            WebError::Halted(Halt::Exception(
                RedirectTo::new(Route::Error).with_flash(FlashMessage::status(API_ERROR_STATUS)),
            ))
        })
}
