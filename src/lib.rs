pub mod check_modules;
pub mod version;
