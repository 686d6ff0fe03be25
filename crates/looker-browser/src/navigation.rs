use futures::{Stream, StreamExt};
use looker_core::LoginNavigation;
use std::time::Duration;

/// Wait for the first navigation event on a stream opened before the action
///
/// An event that fires while the action is still being sent is buffered by the
/// stream, so fast navigations are not missed.
pub(crate) async fn first_navigation<S>(mut events: S, timeout: Duration) -> LoginNavigation
where
    S: Stream + Unpin,
{
    match tokio::time::timeout(timeout, events.next()).await {
        Ok(Some(_)) => LoginNavigation::Navigated,
        Ok(None) => LoginNavigation::NotObserved {
            reason: "navigation event stream ended".to_string(),
        },
        Err(_) => LoginNavigation::NotObserved {
            reason: format!("no navigation within {:?}", timeout),
        },
    }
}
