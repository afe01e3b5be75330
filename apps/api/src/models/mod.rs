pub mod assessment;
pub mod document;
pub mod role;
