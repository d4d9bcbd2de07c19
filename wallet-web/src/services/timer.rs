//! Timer abstraction and the timeout race used around provider requests.
//!
//! The browser build sleeps on `gloo-timers`; tests plug in tokio's virtual
//! clock. Either way a timeout is a plain race: whichever future settles
//! first wins and the loser is dropped. EIP-1193 has no cancellation, so a
//! dropped provider request may still settle on the extension side; callers
//! guard their state with a request generation instead.

use futures::future::{self, Either, LocalBoxFuture};
use std::future::Future;
use std::time::Duration;

/// Source of sleeps.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// The timer won the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

/// Race `fut` against `timer.sleep(duration)`.
pub async fn with_timeout<F>(timer: &dyn Timer, duration: Duration, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    let sleep = timer.sleep(duration);
    futures::pin_mut!(fut);

    match future::select(fut, sleep).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed),
    }
}
