//! Package store over a `site-packages` directory: metadata lookup,
//! wheel extraction and `RECORD`-driven removal.

pub mod extract;
pub mod record;
pub mod store;

pub use store::SitePackages;
