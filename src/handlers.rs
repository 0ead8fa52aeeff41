use crate::errors::AppError;
use crate::models::{BlockListing, Dashboard};
use crate::state::AppState;
use crate::stats::build_dashboard_with_rejections;
use crate::ui::{render_dashboard, render_index};
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&listings(&state)))
}

pub async fn list_blocks(State(state): State<AppState>) -> Json<Vec<BlockListing>> {
    Json(listings(&state))
}

pub async fn block_stats(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(dashboard_for(&state, &slug)?))
}

pub async fn block_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let dashboard = dashboard_for(&state, &slug)?;
    Ok(Html(render_dashboard(&dashboard)))
}

fn dashboard_for(state: &AppState, slug: &str) -> Result<Dashboard, AppError> {
    let loaded = state
        .block(slug)
        .ok_or_else(|| AppError::not_found(format!("no training block named '{slug}'")))?;
    Ok(build_dashboard_with_rejections(
        &loaded.block,
        &loaded.runs,
        loaded.rejected.len(),
    ))
}

fn listings(state: &AppState) -> Vec<BlockListing> {
    state
        .blocks
        .iter()
        .map(|loaded| BlockListing {
            slug: loaded.block.slug.clone(),
            title: loaded.block.title.clone(),
            run_count: loaded.runs.len(),
            rejected_records: loaded.rejected.len(),
        })
        .collect()
}
