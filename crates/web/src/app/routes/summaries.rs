use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Html,
};
use minijinja::context;

use costs_auth::BearerToken;

use crate::app::{AppState, WebError};

use super::common::{check_id, gateway};

pub async fn summaries(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
) -> Result<Html<String>, WebError> {
    let gw = gateway(&state, &token)?;
    let e = &state.endpoints;

    let resource = gw.get(&e.resource()).await?;
    let categories = gw.get(&e.categories_summary()).await?;
    let years = gw.get(&e.years_summary()).await?;

    state.views.render("summaries", context! { resource, categories, years })
}

pub async fn sub_categories_summary(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let category_id = check_id(id)?;
    let gw = gateway(&state, &token)?;
    let e = &state.endpoints;

    let resource = gw.get(&e.resource()).await?;
    let category = gw.get(&e.category(&category_id)).await?;
    let sub_categories = gw.get(&e.sub_categories_summary(&category_id)).await?;

    state.views.render("sub-categories-summary", context! { resource, category, sub_categories })
}

pub async fn tco_summary(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
) -> Result<Html<String>, WebError> {
    let gw = gateway(&state, &token)?;
    let e = &state.endpoints;

    let resource = gw.get(&e.resource()).await?;
    let tco = gw.get(&e.tco_summary()).await?;

    state.views.render("tco-summary", context! { resource, tco })
}

pub async fn months_summary(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let year = check_id(id)?;
    let gw = gateway(&state, &token)?;
    let e = &state.endpoints;

    let resource = gw.get(&e.resource()).await?;
    let months = gw.get(&e.months_summary(&year)).await?;

    state.views.render("months-summary", context! { resource, year, months })
}
