//! Core domain logic for the Forage app.
//! This crate is the single source of truth for forageable records, their
//! observable state, and the wheel-spin reward counter.

pub mod db;
pub mod logging;
pub mod model;
pub mod observe;
pub mod repo;
pub mod reward;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::forageable::{
    is_valid_entry, map_query, Forageable, ForageableId, ForageableInput,
    ForageableValidationError,
};
pub use observe::{ForageableFeed, Subscription, SubscriptionClosed};
pub use repo::forageable_repo::{ForageableStore, RepoError, RepoResult, SqliteForageableStore};
pub use reward::{
    RewardCounter, RewardProgress, SharedRewardCounter, SpinCooldown, WheelSpin,
    DEFAULT_PROGRESS_MAX,
};
pub use service::detail_flow::DetailFlow;
pub use service::edit_flow::{EditFlow, EditFlowError, EditState};
pub use service::forageable_service::{ForageableService, ForageableServiceError, ServiceResult};
pub use service::navigation::NavigationSignal;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
