//! pr-automerge - merge labelled pull requests once GitHub says they are ready
//!
//! Each open pull request that passes the label selection is driven through a
//! small state machine keyed on GitHub's asynchronously computed
//! `mergeable_state`: it is merged, brought up to date with its base, closed,
//! or left alone. Decisions are re-derived from fresh platform state on every
//! step so that concurrent activity on the pull request is tolerated.

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod merge;
pub mod platform;
pub mod policy;
pub mod run;
pub mod types;
