/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Utility functions and structures for the Hermod server.

pub mod background_tasks;
pub mod signing;

use tokio::sync::oneshot;

/// Handles the shutdown process for the server.
///
/// This function waits for a shutdown signal and then returns, letting axum
/// drain in-flight requests.
pub async fn shutdown(shutdown_rx: oneshot::Receiver<()>) {
    let _ = shutdown_rx.await;
}
