use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels the token when the process receives an interrupt. The event loop
/// confirms with the user before actually exiting.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
    };
}

/// A fresh token with a watcher attached. Used at startup and again whenever
/// the user declines an exit, so a later interrupt asks again.
pub fn armed_shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    tokio::spawn(detect_shutdown(token.clone()));
    token
}
