// Property tests for configuration built from events and environment.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::config::{
        CompressionConfig, ENV_FUNCTION_MEMORY_SIZE, ENV_LOG_LEVEL, FilterConfig, TracingConfig,
    };
    use crate::types::error::ArchiverError;
    use proptest::prelude::*;

    fn env_of(pairs: &[(&str, String)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The compression chunk is an eighth of the function memory.
        #[test]
        fn prop_compression_chunk_tracks_function_memory(memory_mb in 128usize..10240) {
            let env = env_of(&[(ENV_FUNCTION_MEMORY_SIZE, memory_mb.to_string())]);
            let config = CompressionConfig::from_env(&env);
            prop_assert_eq!(config.chunk_size, memory_mb * 1024 * 1024 / 8);
            prop_assert_eq!(config.level, 6);
        }

        /// Anything that is not a positive integer falls back to 1024 MiB.
        #[test]
        fn prop_invalid_memory_size_falls_back(value in "[a-z]{0,8}|0|-[0-9]{1,4}") {
            let env = env_of(&[(ENV_FUNCTION_MEMORY_SIZE, value)]);
            prop_assert_eq!(
                CompressionConfig::from_env(&env).chunk_size,
                1024 * 1024 * 1024 / 8
            );
        }

        /// Lookback windows are accepted exactly when positive.
        #[test]
        fn prop_lookback_must_be_positive(minutes in -1000i64..1000) {
            let result = FilterConfig::new("database-1", "log-bucket", minutes, false);
            if minutes > 0 {
                prop_assert_eq!(result.unwrap().lookback_minutes, minutes);
            } else {
                prop_assert_eq!(
                    result.unwrap_err(),
                    ArchiverError::InvalidConfig(
                        "LogRangeMinutes must be greater than 0".to_string()
                    )
                );
            }
        }

        /// Unknown log levels never break tracing configuration.
        #[test]
        fn prop_unknown_log_level_uses_default(level in "[A-Z]{10,16}") {
            let env = env_of(&[(ENV_LOG_LEVEL, level)]);
            let config = TracingConfig::from_env(&env);
            prop_assert_eq!(config.tracing_level, log::Level::Info);
        }
    }
}
