//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::api::handlers::story_handler::{CreatePostForm, CreatePostResponse, ReportStoryRequest};
use domain::StoryUrls;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::story_handler::create_post,
        crate::api::handlers::story_handler::report_story,
        crate::api::handlers::story_handler::get_story,
    ),
    components(
        schemas(
            CreatePostForm,
            CreatePostResponse,
            ReportStoryRequest,
            StoryUrls,
        )
    ),
    tags(
        (name = "Stories", description = "Challenge story posting, reporting and listing"),
    )
)]
pub struct ApiDoc;
