pub mod categories;
pub mod frame;
pub mod profile;
