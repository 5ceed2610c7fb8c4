//! Feature-engineering stages.
//!
//! Each stage is a pure transform: it takes the prior [`FeatureFrame`] and
//! returns a new one, so there is no "did this stage run yet" state to track.
//! [`assemble`] owns the one place where the stage order matters:
//!
//! calendar -> events -> holidays -> sales lags -> entity-signal lags ->
//! inflation -> column reindex

pub mod assemble;
pub mod calendar;
pub mod entity;
pub mod events;
pub mod holidays;
pub mod inflation;
pub mod lags;
