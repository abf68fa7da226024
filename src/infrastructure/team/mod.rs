//! Hackathon team formation

mod invite_code;
mod service;

pub use invite_code::{InviteCodeGenerator, RandomInviteCodes};
pub use service::{
    CreateTeamRequest, JoinTeamRequest, TeamContext, TeamFormationEngine,
    MAX_INVITE_CODE_ATTEMPTS,
};
