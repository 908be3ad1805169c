//! # Deserialization Helpers
//!
//! Amazon Pay sends `null` for fields that have no value yet (a checkout
//! session's `chargeId` before completion, a charge's `softDescriptor`).
//! `#[serde(default)]` only covers missing keys, so plain `String` and `Vec`
//! response fields go through [`null_as_default`].

use serde::{Deserialize, Deserializer};

/// Decode `null` as `T::default()`.
///
/// ```rust,ignore
/// #[derive(Deserialize, Default)]
/// #[serde(default)]
/// struct Resource {
///     #[serde(deserialize_with = "amazonpay_core::de::null_as_default")]
///     charge_id: String,
/// }
/// ```
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
