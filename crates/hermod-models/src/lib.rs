/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! # Hermod-Models
//!
//! Database schema and model definitions for the Hermod webhook delivery
//! service: subscriptions, ingested webhooks, delivery attempts, and the
//! durable task queue backing delivery and cleanup work.

/// Declares the models module, which contains the data structures representing database tables.
pub mod models;

/// Declares the schema module, which contains the database schema definitions.
pub mod schema;
