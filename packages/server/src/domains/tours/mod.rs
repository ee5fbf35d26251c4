pub mod membership;
pub mod models;
pub mod testing;

// Re-export commonly used types
pub use membership::{
    MembershipError, MembershipStore, MembershipToggle, PgMembershipStore, ToggleAction,
    ToggleOutcome,
};
pub use models::{Tour, FEATURED_LIMIT, LIKED_BY};
