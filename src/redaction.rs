//! Allowlist-based printing of resource models for logs.
//!
//! Models can carry members that must never reach a log line: owner
//! information on window targets, task invocation payloads, repository
//! credentials inside patch sources. Rather than enumerate what to hide,
//! each model names the fields that are safe to show and everything else
//! present on the value is masked wholesale.

use serde::Serialize;

/// Marker printed in place of any field not on the allowlist.
pub const REDACTED: &str = "[REDACTED]";

/// Log-safe rendering for resource models.
pub trait SafeLog: Serialize {
    /// Top-level model fields, by serialized name, that may appear in log
    /// output.
    fn allowed_fields() -> &'static [&'static str];

    /// Render the model with non-allowlisted fields masked.
    ///
    /// Absent fields are omitted entirely, so the output also shows which
    /// members were actually set.
    fn safe_log(&self) -> String {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(fields)) => {
                let mut filtered = serde_json::Map::new();
                for (name, value) in fields {
                    if value.is_null() {
                        continue;
                    }
                    if Self::allowed_fields().contains(&name.as_str()) {
                        filtered.insert(name, value);
                    } else {
                        filtered.insert(name, serde_json::Value::String(REDACTED.to_string()));
                    }
                }
                serde_json::Value::Object(filtered).to_string()
            }
            Ok(other) => other.to_string(),
            Err(_) => REDACTED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Sample {
        name: Option<String>,
        owner_information: Option<String>,
        description: Option<String>,
    }

    impl SafeLog for Sample {
        fn allowed_fields() -> &'static [&'static str] {
            &["Name"]
        }
    }

    #[test]
    fn test_masks_disallowed_fields() {
        let sample = Sample {
            name: Some("window-target".to_string()),
            owner_information: Some("team phone number".to_string()),
            description: None,
        };

        let printed = sample.safe_log();
        assert!(printed.contains("window-target"));
        assert!(printed.contains(REDACTED));
        assert!(!printed.contains("team phone number"));
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let sample = Sample {
            name: None,
            owner_information: None,
            description: None,
        };

        assert_eq!(sample.safe_log(), "{}");
    }
}
