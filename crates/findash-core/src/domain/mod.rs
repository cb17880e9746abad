//! Canonical domain model: validated symbols, statement types, fiscal
//! periods, and the normalized statement record.

mod period;
mod record;
mod statement;
mod symbol;

pub use period::{FiscalPeriod, PeriodRange};
pub use record::{now_rfc3339, StatementRecord};
pub use statement::StatementType;
pub use symbol::Symbol;
