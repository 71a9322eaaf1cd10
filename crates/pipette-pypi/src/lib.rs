//! Package index client: PEP 691 JSON project pages, PEP 425 wheel tag
//! filtering, and wheel download with digest verification.

pub mod download;
pub mod repository;
pub mod simple;
pub mod tags;

pub use repository::{PypiRepository, Selector};
