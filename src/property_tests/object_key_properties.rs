// Property tests for destination key generation.

#[cfg(test)]
mod tests {
    use crate::object_key::generate_object_key;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any valid hourly file name, the key is partitioned by the
        /// file name's own timestamp down to the hour and ends with the
        /// base file name.
        #[test]
        fn prop_key_partitions_follow_file_name_timestamp(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            compression_enabled in any::<bool>(),
        ) {
            let timestamp = NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap();
            let date_part = timestamp.format("%Y-%m-%d-%H%M").to_string();
            let file_name = format!("error/postgresql.log.{date_part}");

            let key = generate_object_key("cluster", "instance", &file_name, compression_enabled)
                .unwrap();

            let expected_prefix = format!(
                "cluster/instance/raw/{year:04}/{month:02}/{day:02}/{hour:02}/postgresql.log.{date_part}"
            );
            prop_assert!(key.starts_with(&expected_prefix));
            prop_assert_eq!(key.ends_with(".gz"), compression_enabled);
            prop_assert_eq!(
                key.len(),
                expected_prefix.len() + if compression_enabled { 3 } else { 0 }
            );
        }

        /// Names whose last dot-separated token is not a timestamp never
        /// produce a key.
        #[test]
        fn prop_non_timestamp_suffix_yields_no_key(suffix in "[a-z]{1,12}") {
            let file_name = format!("error/postgresql.log.{suffix}");
            prop_assert!(generate_object_key("cluster", "instance", &file_name, false).is_none());
        }
    }
}
