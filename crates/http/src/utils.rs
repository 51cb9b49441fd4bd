//! Internal helper macros.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Works like `assert!`, but produces an error instead of panicking:
///
/// ```ignore
/// ensure!(header_size <= MAX_HEADER_BYTES, HttpError::header_too_large(header_size, MAX_HEADER_BYTES));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
