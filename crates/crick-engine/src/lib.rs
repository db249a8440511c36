//! Live scoring engine for crick.
//!
//! Turns operator scoring input into ledger deliveries, keeps innings
//! snapshots and the match state machine in step with the ledger, undoes
//! by full replay, and resolves results including super overs.
//!
//! # Layout
//!
//! - [`input`]: scoring payloads and their normalization into deliveries
//! - [`state`]: the pure match state machine
//! - [`result`]: result resolution
//! - [`scorer`]: one match: submit, undo, role and phase operations
//! - [`registry`]: [`Scoreboard`], the multi-match facade
//! - [`hooks`]: notification and career-sync collaborators
//! - [`config`]: match configuration

pub mod config;
pub mod error;
pub mod hooks;
pub mod input;
pub mod registry;
pub mod result;
pub mod scorer;
pub mod state;

pub use config::{MatchConfig, SuperOverConfig, TeamConfig, MAX_OVERS_LIMIT};
pub use error::{ScoringError, ScoringResult};
pub use hooks::{
    CareerRecord, CareerSync, ChannelNotifier, HookDispatcher, HookError, HookEvent, Hooks,
    NoOpHooks, NoticeKind, Notification, Notifier,
};
pub use input::{Batter, ExtraSelection, ScoringInput, WicketInput};
pub use registry::Scoreboard;
pub use result::{Margin, MatchResult, Outcome, ResultResolver};
pub use scorer::{MatchScorer, MatchSnapshot, SubmitOutcome};
pub use state::{MainMatchScore, MatchEvent, MatchPhase, MatchState, RoleField, ScoreLine};
