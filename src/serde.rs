//! # Serde module for CardinalityEstimator
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `CardinalityEstimator`. It uses `serde`'s custom serialization and deserialization mechanisms.
//!
//! `CardinalityEstimator` is serialized as a tuple `(precision, policy, registers)`, where
//! `policy` is the policy name (`raw`, `corrected` or `corrected64`) and `registers` holds
//! one byte per register.
//!
//! During deserialization the register array is validated the same way as
//! [`Registers::from_vec`] does, so malformed payloads are rejected instead of
//! producing an estimator with impossible register values.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::estimator::CardinalityEstimator;
use crate::policy::EstimationPolicy;
use crate::registers::Registers;

impl Serialize for CardinalityEstimator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(&self.policy().to_string())?;
        tup.serialize_element(self.registers().as_slice())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for CardinalityEstimator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (precision, policy, registers): (u8, String, Vec<u8>) =
            Deserialize::deserialize(deserializer)?;
        let policy: EstimationPolicy = policy.parse().map_err(Error::custom)?;
        let registers = Registers::from_vec(precision, registers).map_err(Error::custom)?;
        Ok(CardinalityEstimator::from_registers(registers, policy))
    }
}
