//! Story handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use common::{AppError, AppResult};
use domain::{ImageUpload, StoryUrls};

use crate::api::extractors::{ApiJson, ApiQuery};
use crate::api::AppState;

const FIELD_CHALLENGE_ID: &str = "challengeId";
const FIELD_AUTHOR_ID: &str = "authorId";
const FIELD_IMAGE_FILES: &str = "imageFiles";

/// Multipart form accepted by `POST /stories` (documentation only)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostForm {
    /// Challenge the images are posted to
    pub challenge_id: i64,
    /// Posting user
    pub author_id: i64,
    /// One binary part per image, order is kept
    #[schema(value_type = Vec<String>)]
    pub image_files: Vec<Vec<u8>>,
}

/// Parsed `POST /stories` form.
struct PostUpload {
    challenge_id: i64,
    author_id: i64,
    images: Vec<ImageUpload>,
}

/// URLs of the stories created by a post
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub image_urls: Vec<String>,
}

/// Report request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportStoryRequest {
    #[schema(example = 17)]
    pub story_id: i64,
}

/// Story lookup parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetStoryQuery {
    /// Author whose stories are listed
    pub user_id: i64,
    pub challenge_id: i64,
}

/// Create story routes
pub fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_story).post(create_post))
        .route("/report", post(report_story))
}

/// Upload images as stories of a challenge
#[utoipa::path(
    post,
    path = "/stories",
    tag = "Stories",
    request_body(content = CreatePostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Stories created", body = CreatePostResponse),
        (status = 400, description = "Malformed form or no images"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatePostResponse>)> {
    let form = PostUpload::from_multipart(multipart).await?;

    let image_urls = state
        .story_service
        .create_post(form.challenge_id, form.author_id, form.images)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatePostResponse { image_urls })))
}

/// Report a story; it is removed once it collects enough reports
#[utoipa::path(
    post,
    path = "/stories/report",
    tag = "Stories",
    request_body = ReportStoryRequest,
    responses(
        (status = 204, description = "Report recorded"),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Story not found")
    )
)]
pub async fn report_story(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReportStoryRequest>,
) -> AppResult<StatusCode> {
    state.story_service.report_story(payload.story_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a user's story images within a challenge
#[utoipa::path(
    get,
    path = "/stories",
    tag = "Stories",
    params(GetStoryQuery),
    responses(
        (status = 200, description = "Nickname and image URLs", body = StoryUrls),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_story(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GetStoryQuery>,
) -> AppResult<Json<StoryUrls>> {
    let stories = state
        .story_service
        .get_story(query.user_id, query.challenge_id)
        .await?;
    Ok(Json(stories))
}

impl PostUpload {
    /// Read the form fields; unknown fields are ignored.
    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut challenge_id = None;
        let mut author_id = None;
        let mut images = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_CHALLENGE_ID => {
                    let text = field.text().await.map_err(multipart_error)?;
                    challenge_id = Some(parse_id(FIELD_CHALLENGE_ID, &text)?);
                }
                FIELD_AUTHOR_ID => {
                    let text = field.text().await.map_err(multipart_error)?;
                    author_id = Some(parse_id(FIELD_AUTHOR_ID, &text)?);
                }
                FIELD_IMAGE_FILES => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    images.push(ImageUpload::new(file_name, content_type, bytes.to_vec()));
                }
                other => {
                    tracing::debug!("Ignoring unknown multipart field '{}'", other);
                }
            }
        }

        Ok(Self {
            challenge_id: challenge_id.ok_or_else(|| missing(FIELD_CHALLENGE_ID))?,
            author_id: author_id.ok_or_else(|| missing(FIELD_AUTHOR_ID))?,
            images,
        })
    }
}

fn parse_id(field: &str, value: &str) -> AppResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(format!("{} must be an integer", field)))
}

fn missing(field: &str) -> AppError {
    AppError::validation(format!("{} is required", field))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::bad_request(e.body_text())
}
