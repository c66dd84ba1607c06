//! Assertion macros shared by unit and integration tests.
//!
//! - [`crate::assert_result_ok!`] unwraps an `Ok`, reporting the error otherwise
//! - [`crate::assert_result_err!`] unwraps an `Err`, reporting the value otherwise
//! - [`crate::assert_contains_error!`] checks an error's rendered message
//! - [`crate::assert_ratio_eq!`] compares metric ratios with a tolerance

/// Assert that a Result is Ok and yield the value.
///
/// ```rust,ignore
/// let report = assert_result_ok!(analyze_universe(&universe, &options));
/// ```
#[macro_export]
macro_rules! assert_result_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?} ({}:{})", e, file!(), line!()),
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "{}: expected Ok, got Err: {:?} ({}:{})",
                format!($($msg)+),
                e,
                file!(),
                line!()
            ),
        }
    };
}

/// Assert that a Result is Err and yield the error.
#[macro_export]
macro_rules! assert_result_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?} ({}:{})", value, file!(), line!()),
            Err(e) => e,
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => panic!(
                "{}: expected Err, got Ok: {:?} ({}:{})",
                format!($($msg)+),
                value,
                file!(),
                line!()
            ),
            Err(e) => e,
        }
    };
}

/// Assert that a Result failed with a message containing `pattern`.
#[macro_export]
macro_rules! assert_contains_error {
    ($result:expr, $pattern:expr) => {{
        let err = $crate::assert_result_err!($result);
        let message = err.to_string();
        assert!(
            message.contains($pattern),
            "Error message {:?} does not contain {:?}",
            message,
            $pattern
        );
        err
    }};
}

/// Assert two metric ratios are equal within `1e-9` (or a given epsilon).
#[macro_export]
macro_rules! assert_ratio_eq {
    ($actual:expr, $expected:expr) => {
        $crate::assert_ratio_eq!($actual, $expected, 1e-9)
    };
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        assert!(
            (actual - expected).abs() <= $epsilon,
            "ratio mismatch: {} = {}, expected {} ({}:{})",
            stringify!($actual),
            actual,
            expected,
            file!(),
            line!()
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_result_ok_yields_value() {
        let result: Result<u32, String> = Ok(7);
        assert_eq!(assert_result_ok!(result), 7);
    }

    #[test]
    #[should_panic(expected = "Expected Ok")]
    fn test_assert_result_ok_panics_on_err() {
        let result: Result<u32, String> = Err("boom".into());
        let _ = assert_result_ok!(result);
    }

    #[test]
    #[should_panic(expected = "loading universe: expected Ok")]
    fn test_assert_result_ok_with_context() {
        let result: Result<u32, String> = Err("boom".into());
        let _ = assert_result_ok!(result, "loading {}", "universe");
    }

    #[test]
    fn test_assert_result_err_yields_error() {
        let result: Result<u32, String> = Err("boom".into());
        assert_eq!(assert_result_err!(result), "boom");
    }

    #[test]
    fn test_assert_contains_error() {
        let result: Result<u32, String> = Err("class a.B not found".into());
        assert_contains_error!(result, "not found");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_contains_error_mismatch() {
        let result: Result<u32, String> = Err("cycle".into());
        assert_contains_error!(result, "missing");
    }

    #[test]
    fn test_assert_ratio_eq_tolerates_rounding() {
        assert_ratio_eq!(0.1 + 0.2, 0.3);
        assert_ratio_eq!(2.0 / 3.0, 0.667, 1e-3);
    }

    #[test]
    #[should_panic(expected = "ratio mismatch")]
    fn test_assert_ratio_eq_rejects_distant_values() {
        assert_ratio_eq!(0.5, 0.25);
    }
}
