//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two `Money`
/// values holding the same number of cents are equal, two `Category` values
/// with the same trimmed name are equal. To "modify" one, build a new value.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`Money`, `Category`)
/// - **Entity**: has identity (`Income { id: IncomeId(...), .. }`)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
