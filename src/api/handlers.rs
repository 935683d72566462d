use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;

use super::identity::UserId;
use super::AppState;

// ============================================================
// Request / response bodies
// ============================================================

/// Body for complete/fail commands. `date` defaults to today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceDateBody {
    pub date: Option<NaiveDate>,
}

/// Body for uncheck, which must name the exact date to revert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncheckBody {
    pub date: NaiveDate,
}

/// Result of a quest command. Store-level skips (duplicate date, completion
/// cap) are not errors: the state is simply unchanged, and `skipped` says
/// why so the UI can show a banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skipped: Option<String>,
    pub character: Character,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quest: Option<Quest>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuestsQuery {
    /// Filter by quest type (`daily`, `weekly`, `monthly`, `custom`).
    #[serde(rename = "type")]
    pub quest_type: Option<String>,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Character
// ============================================================

pub async fn get_character(
    State(state): State<AppState>,
    user: UserId,
) -> Json<Character> {
    Json(state.with_store(&user, |store| store.character().clone()))
}

pub async fn update_character(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<UpdateCharacterInput>,
) -> Json<Character> {
    Json(state.with_store(&user, |store| {
        store.update_character(input);
        store.character().clone()
    }))
}

// ============================================================
// Quests
// ============================================================

pub async fn list_quests(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuestsQuery>,
) -> Result<Json<Vec<Quest>>, (StatusCode, String)> {
    let quest_type = match query.quest_type.as_deref() {
        Some(raw) => Some(QuestType::from_str(raw).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Unknown quest type: {raw}"),
        ))?),
        None => None,
    };

    Ok(Json(state.with_store(&user, |store| match quest_type {
        Some(t) => store.quests_by_type(t),
        None => store.quests().to_vec(),
    })))
}

pub async fn create_quest(
    State(state): State<AppState>,
    user: UserId,
    Json(input): Json<CreateQuestInput>,
) -> (StatusCode, Json<Quest>) {
    let quest = state.with_store(&user, |store| store.add_quest(input));
    (StatusCode::CREATED, Json(quest))
}

pub async fn get_quest(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<Quest>, (StatusCode, String)> {
    state
        .with_store(&user, |store| store.quest(id).cloned())
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Quest not found".to_string()))
}

pub async fn delete_quest(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    match state.with_store(&user, |store| store.delete_quest(id)) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(_) => Err((StatusCode::NOT_FOUND, "Quest not found".to_string())),
    }
}

// ============================================================
// Quest commands
// ============================================================

pub async fn complete_quest(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<Uuid>,
    Json(body): Json<InstanceDateBody>,
) -> Result<Json<CommandOutcome>, (StatusCode, String)> {
    state.with_store(&user, |store| {
        let result = store.complete_quest(id, body.date);
        command_outcome(store, id, result)
    })
}

pub async fn uncheck_quest(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<Uuid>,
    Json(body): Json<UncheckBody>,
) -> Result<Json<CommandOutcome>, (StatusCode, String)> {
    state.with_store(&user, |store| {
        let result = store.uncheck_quest(id, body.date);
        command_outcome(store, id, result)
    })
}

pub async fn fail_quest(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<Uuid>,
    Json(body): Json<InstanceDateBody>,
) -> Result<Json<CommandOutcome>, (StatusCode, String)> {
    state.with_store(&user, |store| {
        let result = store.fail_quest(id, body.date);
        command_outcome(store, id, result)
    })
}

/// Map a store result onto the HTTP contract: unknown quest is 404, every
/// other skip is a 200 with the state left as it was.
fn command_outcome(
    store: &mut crate::store::ProgressStore,
    id: Uuid,
    result: Result<(), StoreError>,
) -> Result<Json<CommandOutcome>, (StatusCode, String)> {
    match result {
        Ok(()) => Ok(Json(CommandOutcome {
            applied: true,
            skipped: None,
            character: store.character().clone(),
            quest: store.quest(id).cloned(),
        })),
        Err(StoreError::QuestNotFound(_)) => {
            Err((StatusCode::NOT_FOUND, "Quest not found".to_string()))
        }
        Err(e) => Ok(Json(CommandOutcome {
            applied: false,
            skipped: Some(e.to_string()),
            character: store.character().clone(),
            quest: store.quest(id).cloned(),
        })),
    }
}

// ============================================================
// Maintenance
// ============================================================

pub async fn refresh_daily_quests(
    State(state): State<AppState>,
    user: UserId,
) -> Json<Vec<Quest>> {
    Json(state.with_store(&user, |store| {
        store.refresh_daily_quests();
        store.quests().to_vec()
    }))
}

pub async fn force_refresh_daily_quests(
    State(state): State<AppState>,
    user: UserId,
) -> Json<Vec<Quest>> {
    Json(state.with_store(&user, |store| {
        store.force_refresh_daily_quests();
        store.quests().to_vec()
    }))
}

pub async fn reset_progress(
    State(state): State<AppState>,
    user: UserId,
) -> Json<CommandOutcome> {
    Json(state.with_store(&user, |store| {
        store.reset_progress();
        CommandOutcome {
            applied: true,
            skipped: None,
            character: store.character().clone(),
            quest: None,
        }
    }))
}
