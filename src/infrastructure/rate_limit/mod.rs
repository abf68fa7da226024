//! Blog submission rate limiting

mod clock;
mod quota;

pub use clock::{Clock, FixedClock, SystemClock};
pub use quota::{
    QuotaConfig, QuotaStatus, RateLimitGuard, DEFAULT_SUBMISSIONS_PER_WINDOW,
    DEFAULT_WINDOW_HOURS,
};
