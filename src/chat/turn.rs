//! Gateway dispatch for the chat loop.
//!
//! Exactly one turn may be in flight at a time: the main loop appends the
//! user message, hands a cloned transcript snapshot to a worker task, and
//! then blocks on the result channel instead of reading further input. The
//! worker never touches the session store or the renderer; it only sends
//! the completed result back for the main loop to apply. There is no
//! queuing and no cancellation — exiting mid-request abandons the worker.

use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver};

use crate::client::Gateway;
use crate::error::Result;
use crate::types::{Content, ModelReply};

/// Dispatch one turn on a background task and return the result channel.
///
/// `transcript` is the full message sequence up to and including the
/// just-submitted user message. The channel holds at most the one result.
pub fn dispatch_turn(
    gateway: Arc<dyn Gateway>,
    transcript: Vec<Content>,
) -> Receiver<Result<ModelReply>> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        let result = gateway.send_turn(&transcript).await;
        // Send fails only when the main loop is already gone.
        let _ = tx.send(result).await;
    });
    rx
}
