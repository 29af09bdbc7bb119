//! Environment variable access.
//!
//! Configuration reads the environment through [`EnvSource`] so tests can pass
//! a `HashMap` instead of mutating the process environment.

use std::collections::HashMap;

pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// `"true"` in any letter case is true; anything else, including unset, is false.
pub fn is_env_true(env: &dyn EnvSource, key: &str) -> bool {
    env.var(key)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
