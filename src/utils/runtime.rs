use anyhow::Result;

/// The host is a single logical thread of control, every tick runs to completion before the next
/// one starts.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
