use anyhow::Result;
use inquire::InquireError;

mod spinner;
mod style;

pub use spinner::Spinner;
pub use style::Style;

/// Check if the inquire error is a user cancellation/interruption.
const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Whether `err` is the user backing out of a prompt (Ctrl+C or Escape).
pub fn is_prompt_cancellation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InquireError>()
        .is_some_and(is_prompt_cancelled)
}

/// Wraps a function that uses interactive prompts and handles user cancellation gracefully.
///
/// If the user cancels the prompt, this prints a newline to clean up the
/// terminal and returns `T::default()` instead of propagating the error.
pub fn handle_prompt_cancellation<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
    T: Default,
{
    match f() {
        Err(e) if is_prompt_cancellation(&e) => {
            println!();
            Ok(T::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_prompt_cancellation_ok() {
        let result = handle_prompt_cancellation(|| Ok(7_i32));
        assert_eq!(result.ok(), Some(7));
    }

    #[test]
    fn test_handle_prompt_cancellation_operation_canceled() {
        let result: Result<i32> =
            handle_prompt_cancellation(|| Err(InquireError::OperationCanceled.into()));
        assert_eq!(result.ok(), Some(0));
    }

    #[test]
    fn test_handle_prompt_cancellation_operation_interrupted() {
        let result: Result<()> =
            handle_prompt_cancellation(|| Err(InquireError::OperationInterrupted.into()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_handle_prompt_cancellation_other_error() {
        let result: Result<()> =
            handle_prompt_cancellation(|| Err(anyhow::anyhow!("Some other error")));
        let Err(err) = result else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("Some other error"));
    }

    #[test]
    fn test_is_prompt_cancellation_through_context() {
        let err = anyhow::Error::from(InquireError::OperationCanceled).context("Select file");
        assert!(is_prompt_cancellation(&err));
        assert!(!is_prompt_cancellation(&anyhow::anyhow!("disk full")));
    }

    #[test]
    fn test_is_prompt_cancelled_operation_canceled() {
        assert!(is_prompt_cancelled(&InquireError::OperationCanceled));
    }

    #[test]
    fn test_is_prompt_cancelled_operation_interrupted() {
        assert!(is_prompt_cancelled(&InquireError::OperationInterrupted));
    }

    #[test]
    fn test_is_prompt_cancelled_other_error() {
        let err = InquireError::Custom("test".into());
        assert!(!is_prompt_cancelled(&err));
    }
}
