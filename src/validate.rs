//! Parameter validation.
//!
//! Pure precondition checks run before any entropy is drawn. A failure here
//! means no source was touched and the facade is still fully usable.

use crate::error::{RandomError, RandomResult};

/// Single-sided bound for 32-bit requests: `bound > 0`.
pub fn check_bound_i32(bound: i32) -> RandomResult<()> {
    if bound <= 0 {
        return Err(RandomError::invalid_parameter("bound", bound, "bound must be positive"));
    }
    Ok(())
}

/// Single-sided bound for 64-bit requests: `bound > 0`.
pub fn check_bound_i64(bound: i64) -> RandomResult<()> {
    if bound <= 0 {
        return Err(RandomError::invalid_parameter("bound", bound, "bound must be positive"));
    }
    Ok(())
}

/// Two-sided 32-bit range. Returns the span `max - min`, which must fit in
/// `i32`.
pub fn check_range_i32(min: i32, max: i32) -> RandomResult<i32> {
    if min >= max {
        return Err(RandomError::invalid_parameter(
            "min",
            min,
            alloc::format!("min must be less than max ({})", max),
        ));
    }
    max.checked_sub(min).ok_or_else(|| {
        RandomError::invalid_parameter(
            "max",
            max,
            alloc::format!("range [{}, {}) overflows a 32-bit span", min, max),
        )
    })
}

/// Two-sided 64-bit range. Returns the span `max - min`, which must fit in
/// `i64`.
pub fn check_range_i64(min: i64, max: i64) -> RandomResult<i64> {
    if min >= max {
        return Err(RandomError::invalid_parameter(
            "min",
            min,
            alloc::format!("min must be less than max ({})", max),
        ));
    }
    max.checked_sub(min).ok_or_else(|| {
        RandomError::invalid_parameter(
            "max",
            max,
            alloc::format!("range [{}, {}) overflows a 64-bit span", min, max),
        )
    })
}

/// Request size against the configured ceiling.
pub fn check_size(size: usize, max: usize) -> RandomResult<()> {
    if size > max {
        return Err(RandomError::invalid_parameter(
            "size",
            size,
            alloc::format!("size exceeds the maximum of {} bytes", max),
        ));
    }
    Ok(())
}

/// Signed size as received across the C boundary.
pub fn check_signed_size(size: i64, max: usize) -> RandomResult<usize> {
    if size < 0 {
        return Err(RandomError::invalid_parameter("size", size, "size must not be negative"));
    }
    let size = usize::try_from(size).map_err(|_| {
        RandomError::invalid_parameter("size", size, "size does not fit in memory")
    })?;
    check_size(size, max)?;
    Ok(size)
}

/// A raw buffer pointer must be non-null unless the buffer is empty.
pub fn check_buffer(is_null: bool, len: usize) -> RandomResult<()> {
    if is_null && len > 0 {
        return Err(RandomError::invalid_parameter("buffer", "null", "buffer must not be null"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_bounds() {
        assert!(check_bound_i32(1).is_ok());
        assert!(check_bound_i32(0).is_err());
        assert!(check_bound_i32(i32::MIN).is_err());
        assert!(check_bound_i64(-1).is_err());
        assert!(check_bound_i64(i64::MAX).is_ok());
    }

    #[test]
    fn test_ranges() {
        assert_eq!(check_range_i32(-5, 5), Ok(10));
        assert!(check_range_i32(3, 3).is_err());
        assert!(check_range_i32(4, 3).is_err());

        let err = check_range_i32(i32::MIN, i32::MAX).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidParameter {
                name: "max",
                value: i32::MAX.to_string()
            }
        );

        assert_eq!(check_range_i64(i64::MIN, -1), Ok(i64::MAX));
        assert!(check_range_i64(-1, i64::MAX).is_err());
    }

    #[test]
    fn test_sizes() {
        assert!(check_size(0, 16).is_ok());
        assert!(check_size(16, 16).is_ok());
        assert!(check_size(17, 16).is_err());

        assert_eq!(check_signed_size(8, 16), Ok(8));
        assert!(check_signed_size(-1, 16).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_null_buffer() {
        assert!(check_buffer(true, 0).is_ok());
        assert!(check_buffer(true, 4).is_err());
        assert!(check_buffer(false, 4).is_ok());
    }
}
