pub mod catalog;
pub mod identity;

pub use catalog::Catalog;
pub use identity::IdentityIndex;
