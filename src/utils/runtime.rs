use anyhow::Result;

/// Everything runs on one cooperative queue: ticks and user actions never interleave mid-operation.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
