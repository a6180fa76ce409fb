pub mod root;
pub mod upload;
