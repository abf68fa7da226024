//! Domain layer - Core business logic and entities

pub mod auth;
pub mod blog;
pub mod error;
pub mod event;
pub mod notification;
pub mod storage;
pub mod submission;
pub mod team;

pub use auth::{
    AdminPolicy, AnyAdminPolicy, EmailAllowListPolicy, IdentityVerifier, Principal,
    RoleLabelPolicy,
};
pub use blog::{Blog, BlogId, BlogPatch, BlogStatus, BlogValidationError};
pub use error::{ConflictKind, DomainError, ErrorKind};
pub use event::{Event, EventId, Registration, RegistrationId};
pub use notification::{RegistrationNotice, RegistrationNotifier};
pub use storage::{DocumentQuery, FindResult, Storage, StorageEntity, StorageKey};
pub use submission::{
    ProjectLinks, Submission, SubmissionId, SubmissionPatch, SubmissionStatus,
    SubmissionValidationError,
};
pub use team::{
    HackathonTeam, InviteCode, MemberId, MemberRole, MembershipStatus, TeamId, TeamMember,
    TeamStatus, TeamValidationError,
};
