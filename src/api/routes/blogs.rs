//! Blog post and moderation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{OptionalUser, RequireAdmin, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::blog::{Blog, BlogId, BlogPatch, BlogStatus};
use crate::infrastructure::blog::CreateBlogRequest;
use crate::infrastructure::rate_limit::QuotaStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogApiRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectBlogApiRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBlogsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub featured: bool,
    pub views: u64,
    pub likes: u64,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<&Blog> for BlogResponse {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id().as_str().to_string(),
            title: blog.title().to_string(),
            slug: blog.slug().to_string(),
            content: blog.content().to_string(),
            excerpt: blog.excerpt().to_string(),
            tags: blog.tags().to_vec(),
            cover_image: blog.cover_image().map(String::from),
            author_id: blog.author_id().to_string(),
            author_name: blog.author_name().to_string(),
            status: blog.status().as_str().to_string(),
            rejection_reason: blog.rejection_reason().map(String::from),
            featured: blog.featured(),
            views: blog.views(),
            likes: blog.likes(),
            created_at: blog.created_at().to_rfc3339(),
            updated_at: blog.updated_at().to_rfc3339(),
            published_at: blog.published_at().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBlogsResponse {
    pub blogs: Vec<BlogResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaResponse {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub window_start: String,
}

impl From<QuotaStatus> for QuotaResponse {
    fn from(status: QuotaStatus) -> Self {
        Self {
            allowed: status.allowed,
            remaining: status.remaining,
            limit: status.limit,
            window_start: status.window_start.to_rfc3339(),
        }
    }
}

/// GET /api/blogs/quota
pub async fn quota(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Json<QuotaResponse> {
    Json(QuotaResponse::from(state.quota.check_quota(&user.user_id).await))
}

/// GET /api/blogs?status=&limit=
pub async fn list_blogs(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Query(query): Query<ListBlogsQuery>,
) -> Result<Json<ListBlogsResponse>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => raw.parse::<BlogStatus>().map_err(ApiError::from)?,
        None => BlogStatus::Published,
    };

    let blogs = state
        .blogs
        .list_by_status(status, query.limit, viewer.as_ref())
        .await
        .map_err(ApiError::from)?;

    let blogs: Vec<BlogResponse> = blogs.iter().map(BlogResponse::from).collect();
    let total = blogs.len();

    Ok(Json(ListBlogsResponse { blogs, total }))
}

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateBlogApiRequest>,
) -> Result<(StatusCode, Json<BlogResponse>), ApiError> {
    debug!(user_id = %user.user_id, "Creating blog post");

    let blog = state
        .blogs
        .create(
            CreateBlogRequest {
                title: request.title,
                content: request.content,
                excerpt: request.excerpt,
                tags: request.tags,
                cover_image: request.cover_image,
            },
            &user,
        )
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(BlogResponse::from(&blog))))
}

/// GET /api/blogs/{blog_id}
pub async fn get_blog(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blogs
        .view(&BlogId::new(blog_id), viewer.as_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BlogResponse::from(&blog)))
}

/// PATCH /api/blogs/{blog_id}
pub async fn update_blog(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(blog_id): Path<String>,
    Json(patch): Json<BlogPatch>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blogs
        .update(&BlogId::new(blog_id), patch, &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BlogResponse::from(&blog)))
}

/// DELETE /api/blogs/{blog_id}
pub async fn delete_blog(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(blog_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .blogs
        .delete(&BlogId::new(blog_id), &admin)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/blogs/{blog_id}/approve
pub async fn approve_blog(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blogs
        .approve(&BlogId::new(blog_id), &admin)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BlogResponse::from(&blog)))
}

/// POST /api/blogs/{blog_id}/reject
pub async fn reject_blog(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(blog_id): Path<String>,
    Json(request): Json<RejectBlogApiRequest>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blogs
        .reject(&BlogId::new(blog_id), &request.reason, &admin)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BlogResponse::from(&blog)))
}
