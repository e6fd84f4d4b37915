pub mod operations;
pub mod transport;
