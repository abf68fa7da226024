//! Blog post entity and moderation states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{excerpt_from, normalize_tags, slugify};
use crate::domain::error::{ConflictKind, DomainError};
use crate::domain::storage::{document_id, StorageEntity};

document_id!(
    /// Blog post identifier
    BlogId
);

/// Moderation state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlogStatus {
    Draft,
    #[default]
    Pending,
    Published,
    Rejected,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::validation(format!("Unknown blog status '{}'", other))),
        }
    }
}

/// Requested edit of a post. The last four fields need admin rights.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub status: Option<BlogStatus>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub featured: Option<bool>,
}

impl BlogPatch {
    pub fn touches_privileged_fields(&self) -> bool {
        self.status.is_some() || self.views.is_some() || self.likes.is_some() || self.featured.is_some()
    }

    /// Drops the fields only admins may set
    pub fn strip_privileged(mut self) -> Self {
        self.status = None;
        self.views = None;
        self.likes = None;
        self.featured = None;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.tags.is_none()
            && self.cover_image.is_none()
            && !self.touches_privileged_fields()
    }
}

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    id: BlogId,
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_image: Option<String>,
    author_id: String,
    author_name: String,
    author_email: String,
    status: BlogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    featured: bool,
    views: u64,
    likes: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_at: Option<DateTime<Utc>>,
}

impl Blog {
    /// A new post always waits for moderation
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
    ) -> Self {
        let title = title.into().trim().to_string();
        let content = content.into();
        let now = Utc::now();

        Self {
            id: BlogId::generate(),
            slug: slugify(&title),
            excerpt: excerpt_from(&content),
            title,
            content,
            tags: Vec::new(),
            cover_image: None,
            author_id: author_id.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            status: BlogStatus::Pending,
            rejection_reason: None,
            featured: false,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Uses a supplied excerpt instead of the derived one, unless blank
    pub fn with_excerpt(mut self, excerpt: Option<String>) -> Self {
        if let Some(excerpt) = excerpt.filter(|e| !e.trim().is_empty()) {
            self.excerpt = excerpt.trim().to_string();
        }
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_cover_image(mut self, cover_image: Option<String>) -> Self {
        self.cover_image = cover_image;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &BlogId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    pub fn status(&self) -> BlogStatus {
        self.status
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn featured(&self) -> bool {
        self.featured
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    // Transitions

    fn ensure_pending(&self, action: &str) -> Result<(), DomainError> {
        if self.status != BlogStatus::Pending {
            return Err(DomainError::conflict(
                ConflictKind::InvalidTransition,
                format!("Cannot {} a {} post", action, self.status),
            ));
        }
        Ok(())
    }

    /// `pending -> published`
    pub fn approve(&mut self) -> Result<(), DomainError> {
        self.ensure_pending("approve")?;
        self.set_status(BlogStatus::Published);
        Ok(())
    }

    /// `pending -> rejected`; the reason is stored as given
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_pending("reject")?;
        self.rejection_reason = Some(reason.into());
        self.set_status(BlogStatus::Rejected);
        Ok(())
    }

    fn set_status(&mut self, status: BlogStatus) {
        if status == BlogStatus::Published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        if status != BlogStatus::Rejected {
            self.rejection_reason = None;
        }
        self.status = status;
        self.touch();
    }

    /// Applies an already-authorized patch. Slug and excerpt follow the new
    /// title and content unless an excerpt is given explicitly.
    pub fn apply(&mut self, patch: BlogPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
            self.slug = slugify(&self.title);
        }
        if let Some(content) = patch.content {
            self.excerpt = excerpt_from(&content);
            self.content = content;
        }
        if let Some(excerpt) = patch.excerpt.filter(|e| !e.trim().is_empty()) {
            self.excerpt = excerpt.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = Some(cover_image).filter(|c| !c.trim().is_empty());
        }
        if let Some(views) = patch.views {
            self.views = views;
        }
        if let Some(likes) = patch.likes {
            self.likes = likes;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(status) = patch.status {
            self.set_status(status);
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Blog {
    type Key = BlogId;
    const COLLECTION: &'static str = "blogs";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
