use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels the token on Ctrl-C. Returns early when something else cancels it first, for example
/// the scheduler after the browser disconnected.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
