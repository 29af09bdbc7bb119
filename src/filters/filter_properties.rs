//! Property-based tests for the log file filters.
