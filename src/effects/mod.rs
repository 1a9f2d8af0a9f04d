pub mod filter;
pub mod utility;
