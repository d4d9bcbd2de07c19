//! # Conflict Resolver
//!
//! Some wallet extensions intercept request dispatch even when they are not
//! the intended target (a Solana-only wallet answering an Ethereum account
//! request, for example). While an Ethereum request is in flight the
//! resolver hides the competing globals, then puts them back.
//!
//! Restoration happens when the body settles or when the grace period runs
//! out, whichever comes first, and also when the surrounding future is
//! dropped. Overlapping calls share the concealment: the first holder hides
//! a namespace, the last one to let go restores it.

use futures::future::{self, Either};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crate::services::registry::InjectedEnvironment;
use crate::services::timer::Timer;

pub struct ConflictResolver {
    env: Rc<dyn InjectedEnvironment>,
    timer: Rc<dyn Timer>,
    grace: Duration,
    /// Hold count per concealed namespace.
    holds: RefCell<HashMap<String, usize>>,
}

impl ConflictResolver {
    pub fn new(env: Rc<dyn InjectedEnvironment>, timer: Rc<dyn Timer>, grace: Duration) -> Self {
        Self {
            env,
            timer,
            grace,
            holds: RefCell::new(HashMap::new()),
        }
    }

    /// Run `body` with `namespaces` hidden.
    pub async fn with_exclusive_access<T, F, Fut>(&self, namespaces: &[String], body: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut access = self.acquire(namespaces);
        let body = body();
        futures::pin_mut!(body);

        match future::select(body, self.timer.sleep(self.grace)).await {
            Either::Left((output, _)) => output,
            Either::Right(((), body)) => {
                log::debug!("[conflict] grace period elapsed, restoring namespaces early");
                access.release();
                body.await
            }
        }
    }

    fn acquire(&self, namespaces: &[String]) -> ExclusiveAccess<'_> {
        let mut held = Vec::new();
        let mut holds = self.holds.borrow_mut();

        for namespace in namespaces {
            if let Some(count) = holds.get_mut(namespace) {
                *count += 1;
                held.push(namespace.clone());
            } else if self.env.conceal(namespace) {
                log::debug!("[conflict] concealed window.{}", namespace);
                holds.insert(namespace.clone(), 1);
                held.push(namespace.clone());
            }
        }

        ExclusiveAccess { resolver: self, held }
    }

    fn release(&self, namespaces: &[String]) {
        let mut holds = self.holds.borrow_mut();

        for namespace in namespaces {
            let remaining = match holds.get_mut(namespace) {
                Some(count) => {
                    *count -= 1;
                    *count
                }
                None => continue,
            };

            if remaining == 0 {
                holds.remove(namespace);
                self.env.reveal(namespace);
                log::debug!("[conflict] restored window.{}", namespace);
            }
        }
    }
}

/// Scoped hold on concealed namespaces; released at most once.
struct ExclusiveAccess<'a> {
    resolver: &'a ConflictResolver,
    held: Vec<String>,
}

impl ExclusiveAccess<'_> {
    fn release(&mut self) {
        let held = std::mem::take(&mut self.held);
        self.resolver.release(&held);
    }
}

impl Drop for ExclusiveAccess<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
