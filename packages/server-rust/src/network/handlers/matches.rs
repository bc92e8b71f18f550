//! Match endpoints: create, list, detail and move submission.
//!
//! Request bodies are read as raw bytes and decoded here, so malformed JSON
//! turns into a 400 with a JSON error body instead of axum's default
//! rejection.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gogo_core::{Board, Match, Move, QueryFilter, Stone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::AppState;
use crate::storage::RepositoryError;

/// Board sizes a new match may be created with.
pub const VALID_GRID_SIZES: [usize; 3] = [9, 13, 19];

/// Error response carrying a status code and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let status = match err {
            RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RepositoryError::ConnectionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            RepositoryError::Backend(_) | RepositoryError::MalformedRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "rejecting malformed request body");
        ApiError::bad_request(format!("malformed request body: {e}"))
    })
}

#[derive(Debug, Deserialize)]
struct NewMatchRequest {
    #[serde(rename = "gridsize")]
    grid_size: usize,
    #[serde(rename = "playerWhite")]
    player_white: String,
    #[serde(rename = "playerBlack")]
    player_black: String,
}

impl NewMatchRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !VALID_GRID_SIZES.contains(&self.grid_size) {
            return Err(ApiError::bad_request(format!(
                "gridsize must be one of 9, 13 or 19, got {}",
                self.grid_size
            )));
        }
        if self.player_white.trim().is_empty() || self.player_black.trim().is_empty() {
            return Err(ApiError::bad_request("both player names are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct BoardPosition {
    x: usize,
    y: usize,
}

#[derive(Debug, Deserialize)]
struct NewMoveRequest {
    player: u8,
    position: BoardPosition,
}

impl NewMoveRequest {
    /// Only black and white may move; `0` is the empty cell marker.
    fn to_move(&self) -> Result<Move, ApiError> {
        match Stone::try_from(self.player) {
            Ok(player @ (Stone::Black | Stone::White)) => {
                Ok(Move::new(player, self.position.x, self.position.y))
            }
            _ => Err(ApiError::bad_request(format!(
                "invalid player {}, expected 1 (black) or 2 (white)",
                self.player
            ))),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Summary of one match as returned by create and list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: String,
    /// Unix seconds.
    pub started_at: i64,
    pub gridsize: usize,
    #[serde(rename = "playerWhite")]
    pub player_white: String,
    #[serde(rename = "playerBlack")]
    pub player_black: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub turn: u32,
}

impl From<&Match> for MatchResponse {
    fn from(game: &Match) -> Self {
        Self {
            id: game.id.clone(),
            started_at: game.start_time.timestamp(),
            gridsize: game.grid_size,
            player_white: game.player_white.clone(),
            player_black: game.player_black.clone(),
            turn: game.turn_count,
        }
    }
}

/// A match summary plus the board, rows of `0` / `1` / `2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetailsResponse {
    #[serde(flatten)]
    pub summary: MatchResponse,
    pub gameboard: Board,
}

impl From<&Match> for MatchDetailsResponse {
    fn from(game: &Match) -> Self {
        Self {
            summary: MatchResponse::from(game),
            gameboard: game.board.clone(),
        }
    }
}

/// `GET /test`
pub async fn test_handler() -> Json<serde_json::Value> {
    Json(json!({ "Test": "This is a test" }))
}

/// `POST /matches`
pub async fn create_match_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: NewMatchRequest = parse_body(&body)?;
    request.validate()?;

    let game = Match::new(request.grid_size, request.player_black, request.player_white);
    let response = MatchResponse::from(&game);
    let location = format!("/matches/{}", game.id);

    state.repository.add(game).await.map_err(|e| {
        warn!(match_id = %response.id, error = %e, "failed to store new match");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(match_id = %response.id, gridsize = response.gridsize, "created match");
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(response)).into_response())
}

/// `GET /matches`
///
/// Without query parameters every match is listed. Otherwise the parameters
/// become a [`QueryFilter`]: `scope`, `limit` and `offset` shape the result
/// and any other key must equal the stored field. Any repository failure is
/// reported as 404 with the error message.
pub async fn list_matches_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<MatchResponse>>, ApiError> {
    let result = if params.is_empty() {
        state.repository.list().await
    } else {
        let filter = QueryFilter::extract(params);
        debug!(?filter, "filtering matches");
        state.repository.find(&filter).await
    };
    let matches = result.map_err(|e| {
        warn!(error = %e, "failed to list matches");
        ApiError::new(StatusCode::NOT_FOUND, e.to_string())
    })?;
    Ok(Json(matches.iter().map(MatchResponse::from).collect()))
}

/// `GET /matches/{id}`
pub async fn get_match_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchDetailsResponse>, ApiError> {
    let game = state.repository.get_by_id(&id).await?;
    Ok(Json(MatchDetailsResponse::from(&game)))
}

/// `POST /matches/{id}/moves`
///
/// The turn counter is left as stored; only the board changes.
pub async fn add_move_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<MatchDetailsResponse>), ApiError> {
    let mut game = state.repository.get_by_id(&id).await?;

    let request: NewMoveRequest = parse_body(&body)?;
    let mv = request.to_move()?;
    game.board = game
        .board
        .apply_move(mv)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state
        .repository
        .update_by_id(&id, game.clone())
        .await
        .map_err(|e| {
            warn!(match_id = %id, error = %e, "failed to store move");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    debug!(match_id = %id, %mv, "applied move");
    Ok((StatusCode::CREATED, Json(MatchDetailsResponse::from(&game))))
}
