//! Rule API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateRuleRequest, Rule};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RuleListQuery {
    pub category: Option<String>,
    pub important: Option<bool>,
}

/// GET /api/rules - List rules, optionally filtered by category and
/// importance.
pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<RuleListQuery>,
) -> ApiResult<Vec<Rule>> {
    let mut rules = match query.category.as_deref() {
        Some(category) => state.repo.rules_by_category(category).await?,
        None => state.repo.list_rules().await?,
    };
    if let Some(important) = query.important {
        rules.retain(|r| r.important == important);
    }
    success(rules)
}

/// POST /api/admin/rules - Create a new rule.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRuleRequest>,
) -> ApiResult<Rule> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Rule title is required".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Rule description is required".to_string(),
        ));
    }

    let created = state.repo.add_rule(&request).await?;
    success(created)
}

/// DELETE /api/admin/rules/:id - Delete a rule.
///
/// Removing an unknown ID succeeds and changes nothing.
pub async fn delete_rule(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.remove_rule(&id).await?;
    success(())
}
