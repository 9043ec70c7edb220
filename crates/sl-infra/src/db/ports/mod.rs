mod executor;

pub use executor::DbExecutor;
