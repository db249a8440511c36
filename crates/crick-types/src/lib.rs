//! Foundation types for the crick live scoring engine.
//!
//! Every other crick crate depends on `crick-types`. Nothing in here
//! performs scoring; these are the records the ledger stores and the
//! projection folds.
//!
//! # Key Types
//!
//! - [`PlayerId`] / [`MatchId`]: player and match identities
//! - [`Side`] / [`Stage`] / [`InningsSlot`]: which side bats, in which contest
//! - [`Delivery`]: one bowled event, the atomic unit of the ball ledger
//! - [`Extras`] / [`ExtraKind`]: extras buckets and the delivery's category
//! - [`Wicket`] / [`WicketKind`]: dismissal details
//! - [`PlayingXi`]: the nominated eleven for a side

pub mod delivery;
pub mod error;
pub mod ids;
pub mod innings;
pub mod lineup;
pub mod overs;

pub use delivery::{Delivery, ExtraKind, Extras, Wicket, WicketKind, MAX_RUNS_PER_DELIVERY};
pub use error::TypeError;
pub use ids::{MatchId, PlayerId};
pub use innings::{InningsSlot, Side, Stage};
pub use lineup::PlayingXi;
pub use overs::{format_overs, parse_overs, BALLS_PER_OVER};
