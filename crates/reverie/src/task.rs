//! Service calls wrapped with a timeout and a bounded retry.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::{AnalysisError, Result};

/// How long a single call may take and how many times it may be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub timeout: Duration,
  /// Total attempts including the first one
  pub attempts: u32,
}

impl RetryPolicy {
  /// One retry after the first failure, then give up
  pub fn single_retry(timeout: Duration) -> Self {
    Self { timeout, attempts: 2 }
  }
}

/// One external call, identified by the operation name used in logs and errors
#[derive(Debug, Clone)]
pub struct ServiceTask {
  operation: String,
  policy: RetryPolicy,
}

impl ServiceTask {
  pub fn new(operation: impl Into<String>, policy: RetryPolicy) -> Self {
    Self { operation: operation.into(), policy }
  }

  /// Drive `call` until it succeeds, fails with a non-retryable error, or runs out of attempts.
  ///
  /// A timeout counts as a retryable failure. The final error is logged with the
  /// operation name before being returned.
  pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut attempt = 1;

    loop {
      let outcome = match timeout(self.policy.timeout, call()).await {
        Ok(result) => result,
        Err(_) => Err(AnalysisError::timeout(&self.operation, self.policy.timeout.as_secs())),
      };

      match outcome {
        Ok(value) => return Ok(value),
        Err(e) if e.is_retryable() && attempt < self.policy.attempts => {
          tracing::warn!(operation = %self.operation, attempt, error = %e, "retrying service call");
          attempt += 1;
        }
        Err(e) => {
          tracing::error!(operation = %self.operation, attempt, error = %e, "service call failed");
          return Err(e);
        }
      }
    }
  }
}
