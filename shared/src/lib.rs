pub mod config;
pub mod cors;
pub mod error;
pub mod feed;
pub mod models;
pub mod runtime;
pub mod store;

#[cfg(test)]
pub mod tests;

// Test utilities - publicly exposed with test feature
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
