use recap_core::BackendStatus;
use tokio::{sync::watch, task::JoinHandle};

use crate::view;

/// Waits for the startup health check to record a result. `None` once the controller
/// is gone.
pub async fn next_backend_status(
    status_rx: &mut watch::Receiver<BackendStatus>,
) -> Option<BackendStatus> {
    loop {
        let status = status_rx.borrow_and_update().clone();
        if status != BackendStatus::Checking {
            return Some(status);
        }
        status_rx.changed().await.ok()?;
    }
}

/// Prints the backend status footer as soon as the health check resolves.
pub fn print_when_resolved(mut status_rx: watch::Receiver<BackendStatus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(status) = next_backend_status(&mut status_rx).await {
            tracing::debug!(%status, "backend status resolved");
            println!("{}", view::render_backend_status(&status));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_health_check_outcome() {
        let (tx, mut rx) = watch::channel(BackendStatus::Checking);

        let waiter = tokio::spawn(async move { next_backend_status(&mut rx).await });
        tx.send_replace(BackendStatus::Connected {
            status: "ok".into(),
            version: "0.1.0".into(),
        });

        assert_eq!(
            waiter.await.unwrap().map(|s| s.to_string()).as_deref(),
            Some("Connected: ok (v0.1.0)")
        );
    }

    #[tokio::test]
    async fn returns_status_recorded_before_subscribing() {
        let (tx, _) = watch::channel(BackendStatus::Checking);
        tx.send_replace(BackendStatus::Disconnected);

        let mut rx = tx.subscribe();
        assert_eq!(
            next_backend_status(&mut rx).await,
            Some(BackendStatus::Disconnected)
        );
    }

    #[tokio::test]
    async fn ends_when_controller_is_dropped() {
        let (tx, mut rx) = watch::channel(BackendStatus::Checking);
        drop(tx);
        assert_eq!(next_backend_status(&mut rx).await, None);
    }

    #[tokio::test]
    async fn skips_intermediate_checking_value() {
        let (tx, mut rx) = watch::channel(BackendStatus::Checking);
        tx.send_replace(BackendStatus::Checking);

        let waiter = tokio::spawn(async move { next_backend_status(&mut rx).await });
        tokio::task::yield_now().await;
        tx.send_replace(BackendStatus::Disconnected);

        assert_eq!(waiter.await.unwrap(), Some(BackendStatus::Disconnected));
    }
}
