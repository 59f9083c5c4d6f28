#[cfg(test)]
use mockall::automock;

/// Notified when the service rejects the caller's credentials.
///
/// Registered once by the authentication layer when the client is built.
#[cfg_attr(test, automock)]
pub trait AuthEventSink: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> AuthEventSink for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closures_are_sinks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sink: Arc<dyn AuthEventSink> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sink.on_unauthorized();
        sink.on_unauthorized();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
