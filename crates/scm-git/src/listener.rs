//! Console sink for human-readable progress lines

/// Receives progress lines meant for a build console.
pub trait Listener: Send + Sync {
    fn line(&self, message: &str);
}

/// Forwards progress lines to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl Listener for TracingListener {
    fn line(&self, message: &str) {
        tracing::info!(target: "scm_git::console", "{message}");
    }
}

/// Discards progress lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl Listener for NullListener {
    fn line(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_listeners_are_object_safe() {
        let sinks: Vec<Arc<dyn Listener>> = vec![Arc::new(TracingListener), Arc::new(NullListener)];
        for sink in &sinks {
            sink.line("Fetching upstream changes");
        }
    }
}
