//! Bounded retry combinator

use std::future::Future;

/// Every attempt failed; errors are kept in attempt order
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub errors: Vec<E>,
}

impl<E> Exhausted<E> {
    pub fn last_error(&self) -> Option<&E> {
        self.errors.last()
    }
}

/// Run `op` until it succeeds or `max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. At least one attempt is made.
pub async fn retry_bounded<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = max_attempts.max(1);
    let mut errors = Vec::new();

    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }

    Err(Exhausted { attempts, errors })
}
