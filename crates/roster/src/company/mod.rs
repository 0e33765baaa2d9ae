//! Companies users can belong to.

mod models;
mod repository;
mod service;

pub use models::{Company, CreateCompanyRequest};
pub use repository::CompanyRepository;
pub use service::CompanyService;
