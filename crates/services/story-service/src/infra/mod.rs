//! Infrastructure layer - database and transactions.

mod db;
pub mod migrations;
mod unit_of_work;

pub use db::{Database, HealthProbe};
pub use migrations::Migrator;
pub use unit_of_work::{complete, Persistence, SeaTransaction, Transaction, UnitOfWork};
