//! Blog moderation workflow

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::auth::Principal;
use crate::domain::blog::{
    validate_blog_content, validate_blog_title, validate_rejection_reason, validate_tags, Blog,
    BlogId, BlogPatch, BlogStatus, BlogValidationError,
};
use crate::domain::storage::{DocumentQuery, SortDirection, Storage};
use crate::domain::DomainError;
use crate::infrastructure::counter;
use crate::infrastructure::rate_limit::RateLimitGuard;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

/// Request for creating a post
#[derive(Debug, Clone, Default)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// Drives posts through moderation
#[derive(Debug, Clone)]
pub struct ModerationStateMachine {
    blogs: Arc<dyn Storage<Blog>>,
    quota: Arc<RateLimitGuard>,
}

impl ModerationStateMachine {
    pub fn new(blogs: Arc<dyn Storage<Blog>>, quota: Arc<RateLimitGuard>) -> Self {
        Self { blogs, quota }
    }

    /// Create a post in `pending`, charged against the author's quota
    pub async fn create(
        &self,
        request: CreateBlogRequest,
        author: &Principal,
    ) -> Result<Blog, DomainError> {
        validate_blog_title(&request.title)
            .and_then(|_| validate_blog_content(&request.content))
            .and_then(|_| validate_tags(&request.tags))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let quota = self.quota.enforce(&author.user_id).await?;

        let blog = Blog::new(
            request.title,
            request.content,
            author.user_id.clone(),
            author.name.clone(),
            author.email.clone(),
        )
        .with_excerpt(request.excerpt)
        .with_tags(request.tags)
        .with_cover_image(request.cover_image.filter(|c| !c.trim().is_empty()));

        let blog = self.blogs.create(blog).await?;

        info!(
            blog_id = %blog.id(),
            author_id = blog.author_id(),
            remaining = quota.remaining.saturating_sub(1),
            "Blog post submitted for review"
        );

        Ok(blog)
    }

    /// `pending -> published`
    pub async fn approve(&self, blog_id: &BlogId, admin: &Principal) -> Result<Blog, DomainError> {
        ensure_admin(admin, "approve posts")?;

        let mut blog = self.get(blog_id).await?;
        blog.approve()?;
        let blog = self.blogs.update(blog).await?;

        info!(blog_id = %blog_id, admin_id = %admin.user_id, "Blog post published");
        Ok(blog)
    }

    /// `pending -> rejected`, keeping the reason as given
    pub async fn reject(
        &self,
        blog_id: &BlogId,
        reason: &str,
        admin: &Principal,
    ) -> Result<Blog, DomainError> {
        ensure_admin(admin, "reject posts")?;
        validate_rejection_reason(reason).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut blog = self.get(blog_id).await?;
        blog.reject(reason)?;
        let blog = self.blogs.update(blog).await?;

        info!(blog_id = %blog_id, admin_id = %admin.user_id, "Blog post rejected");
        Ok(blog)
    }

    /// Edit a post. Authors may change content only; admins may change anything.
    pub async fn update(
        &self,
        blog_id: &BlogId,
        patch: BlogPatch,
        caller: &Principal,
    ) -> Result<Blog, DomainError> {
        let mut blog = self.get(blog_id).await?;

        if !caller.is_admin && !blog.is_authored_by(&caller.user_id) {
            return Err(DomainError::authorization(
                "Only the author or an admin can edit this post",
            ));
        }

        let patch = if caller.is_admin {
            patch
        } else {
            if patch.touches_privileged_fields() {
                debug!(blog_id = %blog_id, user_id = %caller.user_id, "Dropping privileged fields from author edit");
            }
            patch.strip_privileged()
        };

        if patch.is_empty() {
            return Ok(blog);
        }

        validate_patch(&patch).map_err(|e| DomainError::validation(e.to_string()))?;

        blog.apply(patch);
        let blog = self.blogs.update(blog).await?;

        info!(blog_id = %blog_id, user_id = %caller.user_id, "Blog post updated");
        Ok(blog)
    }

    pub async fn delete(&self, blog_id: &BlogId, admin: &Principal) -> Result<(), DomainError> {
        ensure_admin(admin, "delete posts")?;

        if !self.blogs.delete(blog_id).await? {
            return Err(not_found(blog_id));
        }

        info!(blog_id = %blog_id, admin_id = %admin.user_id, "Blog post deleted");
        Ok(())
    }

    /// Fetch a post for reading and count the view
    ///
    /// Unpublished posts are only visible to their author and admins.
    pub async fn view(&self, blog_id: &BlogId, viewer: Option<&Principal>) -> Result<Blog, DomainError> {
        let blog = self.get(blog_id).await?;

        if !is_visible(&blog, viewer) {
            return Err(not_found(blog_id));
        }

        let counted =
            counter::adjust_best_effort(self.blogs.as_ref(), blog_id, "views", |b| b.views() + 1)
                .await;

        Ok(counted.unwrap_or(blog))
    }

    /// Newest first. Only published posts are listed for non-admins.
    pub async fn list_by_status(
        &self,
        status: BlogStatus,
        limit: Option<usize>,
        viewer: Option<&Principal>,
    ) -> Result<Vec<Blog>, DomainError> {
        if status != BlogStatus::Published && !viewer.is_some_and(|p| p.is_admin) {
            return Err(DomainError::authorization(format!(
                "Only admins can list {} posts",
                status
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let query = DocumentQuery::new()
            .eq("status", status.as_str())
            .order_by_time("created_at", SortDirection::Descending)
            .with_limit(limit);

        Ok(self.blogs.find(&query).await?.items)
    }

    async fn get(&self, blog_id: &BlogId) -> Result<Blog, DomainError> {
        self.blogs
            .get(blog_id)
            .await?
            .ok_or_else(|| not_found(blog_id))
    }
}

fn ensure_admin(principal: &Principal, action: &str) -> Result<(), DomainError> {
    if !principal.is_admin {
        return Err(DomainError::authorization(format!("Only admins can {}", action)));
    }
    Ok(())
}

fn is_visible(blog: &Blog, viewer: Option<&Principal>) -> bool {
    blog.status() == BlogStatus::Published
        || viewer.is_some_and(|p| p.is_admin || blog.is_authored_by(&p.user_id))
}

fn validate_patch(patch: &BlogPatch) -> Result<(), BlogValidationError> {
    if let Some(ref title) = patch.title {
        validate_blog_title(title)?;
    }
    if let Some(ref content) = patch.content {
        validate_blog_content(content)?;
    }
    if let Some(ref tags) = patch.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

fn not_found(blog_id: &BlogId) -> DomainError {
    DomainError::not_found(format!("Blog post '{}' not found", blog_id))
}
