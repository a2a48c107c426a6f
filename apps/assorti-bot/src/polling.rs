//! Long-polling loop.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::telegram::TelegramClient;

/// Pause after a failed `getUpdates` call.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls for updates until `shutdown` resolves.
///
/// Updates are handled one at a time, in order, so a user's messages can
/// never race each other through the session store.
pub async fn run(
    telegram: &TelegramClient,
    dispatcher: &Dispatcher,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut offset = 0;

    info!("Polling for updates");
    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = telegram.get_updates(offset) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = update.update_id + 1;
                    dispatcher.handle_update(&update).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "getUpdates failed, retrying in {:?}", RETRY_DELAY);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }
    info!("Polling stopped");
}
