pub mod backend;
pub mod bench;
pub mod conf;
pub mod core;
pub mod env;
pub mod observe;

#[cfg(feature = "testutil")]
pub mod testutil;
