//! Convenience macros for error handling and propagation

/// Equivalent to `anyhow::bail!` but for `ReportsError`
///
/// A format string builds a generic error. Any other expression is converted
/// with `From`, so a `ReportsError` keeps its variant.
///
/// # Examples
///
/// ```rust
/// use reports_common::bail;
/// use reports_common::Result;
///
/// fn check_months(months: u32) -> Result<()> {
///     if months == 0 {
///         bail!("Window must span at least one month, got: {}", months);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::ReportsError::new($msg))
    };
    ($err:expr $(,)?) => {
        return Err(::core::convert::From::from($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::ReportsError::new(format!($fmt, $($arg)*)))
    };
}

/// Equivalent to `anyhow::ensure!` but for `ReportsError`
///
/// Accepts the same error forms as [`bail!`].
///
/// # Examples
///
/// ```rust
/// use reports_common::ensure;
/// use reports_common::Result;
///
/// fn validate_capacity(capacity: u64) -> Result<()> {
///     ensure!(capacity > 0, "Cache capacity must be positive, got: {}", capacity);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::ReportsError::new($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err(::core::convert::From::from($err));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::ReportsError::new(format!($fmt, $($arg)*)));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{ReportsError, Result};

    fn positive(value: i64) -> Result<i64> {
        ensure!(value > 0, "value must be positive, got: {}", value);
        Ok(value)
    }

    fn always_fails() -> Result<()> {
        bail!("nothing to see");
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(positive(3).unwrap(), 3);
        let err = positive(-1).unwrap_err();
        assert_eq!(err.to_string(), "value must be positive, got: -1");
    }

    fn named_check(value: u32) -> Result<u32> {
        ensure!(
            value <= 10,
            ReportsError::validation_field("too large", "limits.value")
        );
        Ok(value)
    }

    fn owned_message(name: &str) -> Result<()> {
        let message = format!("unknown name {name}");
        bail!(message);
    }

    #[test]
    fn test_ensure_keeps_error_variant() {
        assert_eq!(named_check(10).unwrap(), 10);
        let err = named_check(11).unwrap_err();
        assert!(matches!(
            err,
            ReportsError::Validation { field: Some(ref f), .. } if f == "limits.value"
        ));
    }

    #[test]
    fn test_bail_with_owned_message() {
        let err = owned_message("x").unwrap_err();
        assert!(matches!(err, ReportsError::Generic { .. }));
        assert_eq!(err.to_string(), "unknown name x");
    }

    #[test]
    fn test_bail_macro() {
        assert_eq!(always_fails().unwrap_err().to_string(), "nothing to see");
    }
}
