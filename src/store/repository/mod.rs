pub mod efficacy;
pub mod mapping;
pub mod opportunity;
pub mod session;

pub use efficacy::InsertOutcome;
pub use mapping::SqliteMappingStore;
