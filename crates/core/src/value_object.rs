//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two value
/// objects with the same attribute values are equal. To "modify" one, build a
/// new one. Entities, by contrast, keep their identity across state changes.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
