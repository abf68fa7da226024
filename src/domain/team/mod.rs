//! Team domain module
//!
//! Hackathon teams are formed per event. A user holds at most one accepted
//! membership per event, either as a team's leader or as a member.

mod entity;
mod invite_code;
mod validation;

pub use entity::{
    HackathonTeam, MemberId, MemberRole, MembershipStatus, TeamId, TeamMember, TeamStatus,
};
pub use invite_code::{InviteCode, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH};
pub use validation::{
    require, validate_max_size, validate_team_description, validate_team_name,
    TeamValidationError, DEFAULT_TEAM_SIZE, MAX_TEAM_SIZE, MIN_TEAM_SIZE,
};
