//! Serde encodings for values that cross a serialization boundary.
//!
//! Integers are arbitrary precision. Within the safe-integer range of a
//! double (magnitude at most 2^53 - 1) they are written as plain numbers so
//! that every JSON consumer reads them exactly; beyond it they are written
//! as decimal strings.

/// Largest magnitude written as a plain number.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// `#[serde(with = "crate::encoding::bigint")]` for [`BigInt`](num_bigint::BigInt) fields.
pub mod bigint {
    use std::fmt;

    use num_bigint::BigInt;
    use num_traits::ToPrimitive;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::MAX_SAFE_INTEGER;

    /// Serializes small integers as numbers and large ones as strings.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(n: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        match n.to_i64() {
            Some(small) if small.abs() <= MAX_SAFE_INTEGER => serializer.serialize_i64(small),
            _ => serializer.serialize_str(&n.to_string()),
        }
    }

    /// Accepts integers, integral floats, and decimal strings.
    ///
    /// # Errors
    ///
    /// Fails on non-integral floats and strings that are not decimal integers.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(BigIntVisitor)
    }

    struct BigIntVisitor;

    impl Visitor<'_> for BigIntVisitor {
        type Value = BigInt;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an integer or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::float_cmp
        )]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigInt, E> {
            if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER as f64 {
                Ok(BigInt::from(v as i64))
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}
