pub mod cipher;
pub mod config;
pub mod discovery;
pub mod fetch;
pub mod filter;
pub mod paths;
pub mod quota;
pub mod retry;
pub mod upstream;
pub mod vault;
