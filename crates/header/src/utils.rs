//! Helpers shared across the crate.

/// Returns `Err($error)` early when `$predicate` is false.
///
/// The error expression is only evaluated on failure, so it may allocate freely.
///
/// ```ignore
/// ensure!(is_valid_name(name), HeaderError::invalid_name(name));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
