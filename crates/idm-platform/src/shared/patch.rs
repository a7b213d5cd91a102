//! Partial update helpers
//!
//! Patch documents carry `Option<T>` per field: `None` leaves the target
//! alone, `Some(v)` overwrites it, including `Some(false)` and `Some("")`.

use crate::usecase::UseCaseError;

/// Call `writer` with the value when the patch field is present.
pub fn set_if_present<T>(value: Option<T>, writer: impl FnOnce(T)) {
    if let Some(value) = value {
        writer(value);
    }
}

/// Applies a patch document of type `P` onto a target of type `T`.
///
/// An absent patch is a no-op. Implementations mutate `target` in place and
/// stop at the first rejected field.
pub trait UpdateFunction<T, P> {
    fn apply(&self, target: &mut T, patch: Option<&P>) -> Result<(), UseCaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_if_present_overwrites_with_falsy_values() {
        let mut flag = true;
        set_if_present(Some(false), |v| flag = v);
        assert!(!flag);

        let mut name = "before".to_string();
        set_if_present(Some(String::new()), |v| name = v);
        assert_eq!(name, "");
    }

    #[test]
    fn test_set_if_present_skips_absent() {
        let mut flag = true;
        set_if_present(None, |v: bool| flag = v);
        assert!(flag);
    }
}
