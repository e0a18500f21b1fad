pub mod enrollment;
pub mod profile;
pub mod records;
