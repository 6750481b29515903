//! Strongly-typed identifiers for the finance aggregates.

use pocketbook_core::unique_id_newtype;

unique_id_newtype!(
    /// Identifier of a [`crate::Client`].
    ClientId
);

unique_id_newtype!(IncomeId);

unique_id_newtype!(ExpenseId);

unique_id_newtype!(GoalId);
