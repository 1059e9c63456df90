//! Async HTTP client for the GitHub license endpoint.
//!
//! [`github::fetch_license`] returns `Ok(Some(..))` with the decoded license
//! on success, `Ok(None)` when the repository URL does not resolve to a
//! GitHub `owner/repo` pair, and `Err` on network, HTTP, or decode failures.

pub mod github;
