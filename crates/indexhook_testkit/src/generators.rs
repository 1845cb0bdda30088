//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records, field mappings and
//! ancestry paths.

use indexhook_core::{FieldValue, Fields, IndexRecord};
use proptest::prelude::*;

/// Strategy for generating field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9]{0,15}").expect("Invalid regex")
}

/// Strategy for generating a single field value, nulls included.
pub fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        1 => Just(FieldValue::Null),
        1 => any::<bool>().prop_map(FieldValue::Bool),
        2 => any::<i64>().prop_map(FieldValue::Integer),
        1 => ((i64::MAX as u64) + 1..=u64::MAX).prop_map(FieldValue::Unsigned),
        1 => any::<f64>().prop_map(FieldValue::Float),
        4 => prop::string::string_regex("[a-zA-Z0-9 ]{0,24}")
            .expect("Invalid regex")
            .prop_map(FieldValue::Text),
    ]
}

/// Strategy for generating an ordered field mapping.
///
/// Generated names may repeat; later values replace earlier ones in place.
pub fn fields_strategy(max_fields: usize) -> impl Strategy<Value = Fields> {
    prop::collection::vec(
        (
            field_name_strategy(),
            prop::collection::vec(field_value_strategy(), 0..4),
        ),
        0..=max_fields,
    )
    .prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating a well-formed ancestry path such as `-1,1066,1234`.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(1u32..1_000_000, 0..8).prop_map(|ids| {
        std::iter::once("-1".to_string())
            .chain(ids.into_iter().map(|id| id.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    })
}

/// Strategy for generating a path with at least one empty segment.
pub fn malformed_path_strategy() -> impl Strategy<Value = String> {
    (path_strategy(), prop_oneof![Just(","), Just(",,")]).prop_map(|(path, tail)| {
        // A trailing delimiter always leaves an empty final segment.
        format!("{path}{tail}")
    })
}

/// Strategy for generating a record with a path field.
pub fn record_strategy(categories: &'static [&'static str]) -> impl Strategy<Value = IndexRecord> {
    (
        1u32..1_000_000,
        prop::sample::select(categories),
        path_strategy(),
        fields_strategy(4),
    )
        .prop_map(|(id, category, path, mut fields)| {
            fields.insert("path", vec![FieldValue::text(path)]);
            IndexRecord::new(id.to_string(), category, fields)
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexhook_core::{
        combine_values, search_path_value, tokenize_path, CombinedFieldTransform, IndexTransform,
        PATH_DELIMITER,
    };

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_paths_tokenize(path in path_strategy()) {
            let tokens = tokenize_path(&path, PATH_DELIMITER).unwrap();
            prop_assert!(tokens.starts_with("-1"));
            prop_assert_eq!(tokens.matches(' ').count(), path.matches(',').count());
        }

        #[test]
        fn malformed_paths_pass_through(path in malformed_path_strategy()) {
            prop_assert!(tokenize_path(&path, PATH_DELIMITER).is_err());
            prop_assert_eq!(search_path_value(&path, PATH_DELIMITER), path);
        }

        #[test]
        fn combined_is_deterministic(fields in fields_strategy(6)) {
            prop_assert_eq!(combine_values(&fields), combine_values(&fields));
        }

        #[test]
        fn combined_has_one_line_per_non_null(fields in fields_strategy(6)) {
            let non_null = fields
                .iter()
                .flat_map(|(_, values)| values.iter())
                .filter(|v| !v.is_null())
                .count();
            let combined = combine_values(&fields);
            let lines = if non_null == 0 { 0 } else { combined.split('\n').count() };
            prop_assert_eq!(lines, non_null);
        }

        #[test]
        fn combined_transform_is_stable(record in record_strategy(&["content"])) {
            let t = CombinedFieldTransform::new(Vec::<String>::new());
            let mut record = record;
            if let Some(updated) = t.transform(&record).unwrap() {
                record.set_fields(updated);
            }
            prop_assert!(t.transform(&record).unwrap().is_none());
        }

        #[test]
        fn tokenized_path_round_trips(path in path_strategy()) {
            let tokens = tokenize_path(&path, PATH_DELIMITER).unwrap();
            prop_assert!(!tokens.contains(PATH_DELIMITER));
            prop_assert_eq!(tokens.replace(' ', ","), path);
        }

        #[test]
        fn records_carry_path(record in record_strategy(&["content", "media"])) {
            prop_assert!(record.fields().contains("path"));
            prop_assert!(record.is_category(&["content", "media"]));
        }
    }
}
