pub mod connectivity;
pub mod export;
