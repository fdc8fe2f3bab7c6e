use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow: {v}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_counts() {
        assert!(u32_from_i64("total_seen", -1).is_err());
        assert!(u64_from_i64("value", -3).is_err());
        assert_eq!(u32_from_i64("total_seen", 7).unwrap(), 7);
    }

    #[test]
    fn rejects_u32_overflow() {
        let err = u32_from_i64("best_streak", i64::from(u32::MAX) + 1).unwrap_err();
        assert!(err.to_string().contains("best_streak"));
    }
}
