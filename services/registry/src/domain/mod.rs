pub mod collection;
pub mod store;
pub mod types;
