//! Integration tests for the classifier adapter against a mock Messages API

mod common;
mod test_classify;
mod test_errors;
