//! Input thread: polls the keyboard and queues key commands.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::debug;

use crate::term::KeySource;

use super::Shared;
use super::command::Command;

/// How long one poll blocks before the stop flag is rechecked.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub(crate) fn run(shared: Arc<Shared>, mut keys: Box<dyn KeySource>, tx: Sender<Command>) {
    debug!("input thread started");
    while !shared.stopped() {
        let key = match keys.poll_key(POLL_TIMEOUT) {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(err) => {
                debug!("key poll failed: {}", err);
                continue;
            }
        };
        // Tag the press with the tab it was aimed at. Before the first
        // registration there is no target, so the press is dropped.
        let Some(tab) = shared.active_tab() else {
            continue;
        };
        if tx.send(Command::Key { tab, key }).is_err() {
            break;
        }
    }
    debug!("input thread stopped");
}
