use thiserror::Error;

/// Invariant violations reported as conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A registration already exists for this (event, user) pair
    AlreadyRegistered,
    /// The event has reached its capacity
    EventFull,
    /// The team is locked or already submitted
    TeamLocked,
    /// The team has reached its maximum size
    TeamFull,
    /// The user already belongs to this team
    AlreadyMember,
    /// The user leads another team for the same event
    AlreadyLeader,
    /// The user belongs to another team for the same event
    AlreadyInTeam,
    /// The team already has a submission for this event
    DuplicateSubmission,
    /// The requested state transition is not allowed from the current state
    InvalidTransition,
    /// A document with the same key already exists
    AlreadyExists,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered => "already_registered",
            Self::EventFull => "event_full",
            Self::TeamLocked => "team_locked",
            Self::TeamFull => "team_full",
            Self::AlreadyMember => "already_member",
            Self::AlreadyLeader => "already_leader",
            Self::AlreadyInTeam => "already_in_team",
            Self::DuplicateSubmission => "duplicate_submission",
            Self::InvalidTransition => "invalid_transition",
            Self::AlreadyExists => "already_exists",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy shared by every coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimited,
    Dependency,
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict ({kind}): {message}")]
    Conflict { kind: ConflictKind, message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String, retry_after_secs: u64 },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            message: message.into(),
        }
    }

    /// Generic key collision raised by storage backends
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::conflict(ConflictKind::AlreadyExists, message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Storage { .. } | Self::Notification { .. } | Self::Internal { .. } => {
                ErrorKind::Dependency
            }
        }
    }

    /// Returns the conflict kind when this is a conflict error
    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            Self::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True when the store refused a create because the key is taken
    pub fn is_key_collision(&self) -> bool {
        self.conflict_kind() == Some(ConflictKind::AlreadyExists)
    }
}
