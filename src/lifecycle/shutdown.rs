//! Stop flag shared by the server and the signal listener.

use std::future::Future;

use tokio::sync::watch;

/// Cloneable handle on a one-way stop flag.
///
/// Once triggered the flag stays set, so a server that starts waiting after
/// the signal arrived still stops.
#[derive(Clone)]
pub struct Shutdown {
    stopped: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self { stopped }
    }

    /// Raise the flag. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.stopped.send_replace(true);
    }

    /// Future that resolves once the flag is raised, or once every handle
    /// has been dropped.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.stopped.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await.map(|_| ());
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_waiter() {
        let shutdown = Shutdown::new();
        let a = shutdown.signalled();
        let b = shutdown.clone().signalled();

        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), async { tokio::join!(a, b) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_late_waiter_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), shutdown.signalled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_not_signalled_until_triggered() {
        let shutdown = Shutdown::new();
        let waiting = tokio::time::timeout(Duration::from_millis(50), shutdown.signalled()).await;
        assert!(waiting.is_err());
    }
}
