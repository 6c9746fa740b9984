//! Pure arithmetic on request operands.

/// Apply `op` to the operands. `None` means the request fails: division
/// by zero or an operator outside `+ - * /`.
///
/// Arithmetic wraps at 32 bits to match the fixed-width wire format;
/// `i32::MIN / -1` wraps to `i32::MIN` instead of trapping.
pub fn calculate(a: i32, b: i32, op: u8) -> Option<i32> {
    match op {
        b'+' => Some(a.wrapping_add(b)),
        b'-' => Some(a.wrapping_sub(b)),
        b'*' => Some(a.wrapping_mul(b)),
        b'/' => {
            if b == 0 {
                None
            } else {
                Some(a.wrapping_div(b))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition() {
        assert_eq!(calculate(2, 3, b'+'), Some(5));
        assert_eq!(calculate(-2, 3, b'+'), Some(1));
    }

    #[test]
    fn test_subtraction() {
        assert_eq!(calculate(2, 3, b'-'), Some(-1));
    }

    #[test]
    fn test_multiplication() {
        assert_eq!(calculate(-4, 6, b'*'), Some(-24));
    }

    #[test]
    fn test_division_truncates() {
        assert_eq!(calculate(7, 2, b'/'), Some(3));
        assert_eq!(calculate(-7, 2, b'/'), Some(-3));
        assert_eq!(calculate(10, 5, b'/'), Some(2));
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert_eq!(calculate(10, 0, b'/'), None);
        assert_eq!(calculate(0, 0, b'/'), None);
        assert_eq!(calculate(i32::MIN, 0, b'/'), None);
    }

    #[test]
    fn test_unknown_operator_fails() {
        assert_eq!(calculate(1, 1, b'%'), None);
        assert_eq!(calculate(1, 1, b'?'), None);
        assert_eq!(calculate(1, 1, 0), None);
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(calculate(i32::MAX, 1, b'+'), Some(i32::MIN));
        assert_eq!(calculate(i32::MIN, 1, b'-'), Some(i32::MAX));
        assert_eq!(calculate(i32::MAX, 2, b'*'), Some(-2));
        assert_eq!(calculate(i32::MIN, -1, b'/'), Some(i32::MIN));
    }
}
