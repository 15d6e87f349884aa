pub mod loader;

pub use loader::{IncomeRecord, PeriodLoader, PeriodLoaderError};
