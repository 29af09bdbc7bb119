//! Root-level property-based tests.

mod config_properties;
mod object_key_properties;
