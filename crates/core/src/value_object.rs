//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable domain objects compared entirely by their
/// attribute values; two with the same values are the same thing. To "modify"
/// one, construct a new one. `CommissionTerms` is a value object; `Supplier`
/// is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
