//! Personal-finance domain: money, categories, incomes, expenses, savings
//! goals and the `Client` aggregate that ties them together.

mod category;
mod client;
mod events;
mod expense;
mod goal;
mod ids;
mod income;
mod money;

pub use category::Category;
pub use client::{Client, ClientSnapshot, NewClient, ProfileUpdate};
pub use events::{ClientEvent, ClientEventKind};
pub use expense::{Expense, ExpenseProps, NewExpense};
pub use goal::{Goal, GoalProps, NewGoal};
pub use ids::{ClientId, ExpenseId, GoalId, IncomeId};
pub use income::{Income, IncomeProps, NewIncome};
pub use money::{Money, MoneyError};
