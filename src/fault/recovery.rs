use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use crate::context::{Context, Handler};
use crate::error::HttpError;

/// A handler that drives the rest of the pipeline under panic protection.
///
/// A panic payload that is an [`HttpError`] is surfaced as that error (a
/// handler deep in someone else's code may only be able to bail that way);
/// any other payload becomes a 500 error wrapping the panic text. Errors
/// returned normally pass through untouched.
pub fn recovery() -> Handler {
    Arc::new(|ctx: &mut Context<'_>| {
        match catch_unwind(AssertUnwindSafe(|| ctx.next())) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let err = panic_to_error(panic);
                error!(
                    error = %err,
                    backtrace = %Backtrace::capture(),
                    "handler panicked"
                );
                Err(err)
            }
        }
    })
}

fn panic_to_error(panic: Box<dyn Any + Send>) -> anyhow::Error {
    match panic.downcast::<HttpError>() {
        Ok(http_err) => (*http_err).into(),
        Err(panic) => {
            let text = if let Some(s) = panic.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unexpected panic".to_string()
            };
            HttpError::internal(text).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_panic_text_becomes_internal_error() {
        let err = panic_to_error(Box::new("boom"));
        let http_err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_err.message(), "boom");
    }

    #[test]
    fn test_http_error_payload_passes_through() {
        let err = panic_to_error(Box::new(HttpError::new(StatusCode::UNAUTHORIZED)));
        let http_err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http_err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_string_payload() {
        let err = panic_to_error(Box::new(format!("worker {} died", 3)));
        assert_eq!(err.to_string(), "worker 3 died");
    }
}
