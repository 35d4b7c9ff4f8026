//! # Hermod Server
//!
//! `hermod-server` is the service crate of Hermod, a reliable webhook
//! delivery system. It accepts event payloads for registered subscriptions,
//! persists them, and delivers them to subscriber URLs as signed HTTP POSTs
//! with bounded retries and a queryable delivery history.
//!
//! ## Features
//!
//! - **At-least-once delivery**: a durable two-lane task queue with
//!   visibility timeouts drives delivery and retention work.
//! - **Bounded retries**: transient failures are retried on a configurable
//!   backoff schedule; permanent rejections terminate the chain.
//! - **Signed payloads**: every delivery carries an HMAC-SHA256 signature of
//!   the exact body bytes under the subscription secret.

pub mod api;
pub mod cache;
pub mod cli;
pub mod dal;
pub mod db;
pub mod delivery;
pub mod metrics;
pub mod queue;
pub mod utils;
