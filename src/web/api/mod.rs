pub mod error;
pub mod reentries;
