//! Coin endpoints
//!
//! - `POST /api/coins/identify`: recognize a coin from two images and store it
//! - `GET /api/coins`: list stored coins, most recent first
//! - `PATCH|PUT /api/coins/:id`: rename a coin
//!
//! Identify runs its stages strictly in order: read images, recognize,
//! generate id, save front, save back, insert row. A failure ends the request
//! at that stage. Nothing already written is rolled back, so a failure after
//! recognition may leave image files without a row.

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartRejection},
        DefaultBodyLimit, Path, State,
    },
    routing::{get, patch, post},
    Json, Router,
};
use coinlens_common::models::{back_image_name, front_image_name};
use coinlens_common::CoinView;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field holding the front image
pub const FRONT_IMAGE_FIELD: &str = "front_image";

/// Multipart field holding the back image
pub const BACK_IMAGE_FIELD: &str = "back_image";

/// Maximum identify request body size (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Update request body
#[derive(Debug, Deserialize)]
pub struct UpdateCoinRequest {
    #[serde(default)]
    pub name: String,
}

/// Both coin images, fully read into memory
///
/// The same buffers feed the recognition call and the image store.
struct CoinImages {
    front: Bytes,
    back: Bytes,
}

/// Build coin routes
pub fn coin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/coins/identify",
            post(identify_coin).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/coins", get(list_coins))
        .route("/api/coins/:id", patch(update_coin).put(update_coin))
}

/// Read the two image parts from the form
///
/// Other fields are ignored; if a part is repeated the first one wins.
async fn read_coin_images(multipart: &mut Multipart) -> ApiResult<CoinImages> {
    let mut front: Option<Bytes> = None;
    let mut back: Option<Bytes> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Unable to parse form: {}", e);
                return Err(ApiError::BadRequest("Unable to parse form".to_string()));
            }
        };

        let name = field.name().map(str::to_owned);
        let (slot, label) = match name.as_deref() {
            Some(FRONT_IMAGE_FIELD) => (&mut front, "front"),
            Some(BACK_IMAGE_FIELD) => (&mut back, "back"),
            _ => continue,
        };
        if slot.is_some() {
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            error!("Failed to read {} image: {}", label, e);
            ApiError::Internal(format!("Failed to read {} image", label))
        })?;
        info!("Read {} image: {} bytes", label, bytes.len());
        *slot = Some(bytes);
    }

    let front = front
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {}", FRONT_IMAGE_FIELD)))?;
    let back = back.ok_or_else(|| ApiError::BadRequest(format!("Missing {}", BACK_IMAGE_FIELD)))?;

    Ok(CoinImages { front, back })
}

/// POST /api/coins/identify
///
/// Returns `{id, name, description, year, country}` only; image URLs and
/// `created_at` are not part of this response.
pub async fn identify_coin(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<CoinView>> {
    info!("IdentifyCoin: request received");

    let mut multipart = multipart.map_err(|e| {
        warn!("Unable to parse form: {}", e);
        ApiError::BadRequest("Unable to parse form".to_string())
    })?;
    let images = read_coin_images(&mut multipart).await?;

    let analysis = state
        .recognizer
        .identify_coin(&images.front, &images.back)
        .await
        .map_err(|e| {
            error!("Recognition error: {}", e);
            ApiError::Internal("Failed to identify coin".to_string())
        })?;
    info!(name = %analysis.name, "Recognition successful");

    let coin_id = Uuid::new_v4().to_string();

    state
        .images
        .save(&front_image_name(&coin_id), &images.front)
        .await
        .map_err(|e| {
            error!(coin_id = %coin_id, "Storage error front: {}", e);
            ApiError::Internal("Failed to save images".to_string())
        })?;

    state
        .images
        .save(&back_image_name(&coin_id), &images.back)
        .await
        .map_err(|e| {
            error!(coin_id = %coin_id, "Storage error back: {}", e);
            ApiError::Internal("Failed to save images".to_string())
        })?;

    db::coins::insert_coin(&state.db, &coin_id, &analysis)
        .await
        .map_err(|e| {
            error!(coin_id = %coin_id, "DB error: {}", e);
            ApiError::Internal("Failed to save to database".to_string())
        })?;

    info!(coin_id = %coin_id, "Coin identified and saved");

    Ok(Json(CoinView::from_analysis(coin_id, analysis)))
}

/// GET /api/coins
pub async fn list_coins(State(state): State<AppState>) -> ApiResult<Json<Vec<CoinView>>> {
    let coins = db::coins::list_coins(&state.db)
        .await
        .map_err(|e| ApiError::from_common(e, "Failed to fetch coins"))?;
    info!("GetCoins: found {} coins", coins.len());

    Ok(Json(coins.into_iter().map(CoinView::from).collect()))
}

/// PATCH|PUT /api/coins/:id
///
/// The body is decoded as JSON regardless of its `Content-Type`.
pub async fn update_coin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<CoinView>> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing coin ID".to_string()));
    }

    let payload: UpdateCoinRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Invalid update body: {}", e);
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let coin = db::coins::update_coin_name(&state.db, &id, &payload.name)
        .await
        .map_err(|e| ApiError::from_common(e, "Failed to update coin"))?;
    info!(coin_id = %coin.id, "Coin renamed");

    Ok(Json(CoinView::from(coin)))
}
