pub mod failing_store;
pub mod fixtures;
pub mod http_test_utils;
pub mod test_logging;
