pub mod enrollment;
pub mod profile;
