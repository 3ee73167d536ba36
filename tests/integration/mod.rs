//! Integration tests for the Stockroom inventory store

mod parse_matrix;
mod record_service;
