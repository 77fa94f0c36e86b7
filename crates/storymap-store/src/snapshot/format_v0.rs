//! Snapshot Format v0 schema
//!
//! Flat record lists; hierarchy is carried by `parent_id` + `order` on
//! stories and by list position for tests of the same story. Versions and
//! timestamps are optional; when present the importer restores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storymap_core::model::Assignee;
use storymap_core::{TestStatus, WorkflowStatus};

/// Top-level snapshot file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    #[serde(default)]
    pub merge_requests: Vec<SnapshotMergeRequest>,

    #[serde(default)]
    pub stories: Vec<SnapshotStory>,

    #[serde(default)]
    pub tests: Vec<SnapshotTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMergeRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub drift: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStory {
    pub id: String,
    pub mr_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Position among siblings; only relative order matters on import
    #[serde(default)]
    pub order: u32,
    pub title: String,
    #[serde(default)]
    pub as_a: String,
    #[serde(default)]
    pub i_want: String,
    #[serde(default)]
    pub so_that: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<i64>,
    /// Map `{name, email}` or the short form `"Name <email>"`
    #[serde(
        default,
        deserialize_with = "deserialize_assignee",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub status: WorkflowStatus,
    /// Optimistic concurrency counter carried across save and load
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTest {
    pub id: String,
    pub story_id: String,
    pub title: String,
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub then: String,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Custom deserializer normalizing the two assignee spellings
fn deserialize_assignee<'de, D>(deserializer: D) -> Result<Option<Assignee>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct AssigneeVisitor;

    impl<'de> Visitor<'de> for AssigneeVisitor {
        type Value = Option<Assignee>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("\"Name <email>\" or a map with 'name' and 'email'")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let (name, rest) = value
                .split_once('<')
                .ok_or_else(|| E::custom(format!("assignee '{}' lacks <email>", value)))?;
            let email = rest
                .strip_suffix('>')
                .ok_or_else(|| E::custom(format!("assignee '{}' lacks closing '>'", value)))?;
            Ok(Some(Assignee {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
            }))
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: de::MapAccess<'de>,
        {
            let mut name = None;
            let mut email = None;
            while let Some(key) = map.next_key::<String>()? {
                match key.as_str() {
                    "name" => name = Some(map.next_value()?),
                    "email" => email = Some(map.next_value()?),
                    _ => {
                        map.next_value::<de::IgnoredAny>()?;
                    }
                }
            }
            Ok(Some(Assignee {
                name: name.ok_or_else(|| de::Error::missing_field("name"))?,
                email: email.ok_or_else(|| de::Error::missing_field("email"))?,
            }))
        }
    }

    deserializer.deserialize_option(AssigneeVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_snapshot() {
        let yaml = r#"
schema_version: 0
merge_requests:
  - id: mr-1
    title: "Checkout"
stories:
  - id: s1
    mr_id: mr-1
    title: "Pay by card"
"#;

        let snapshot: SnapshotV0 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.schema_version, 0);
        assert_eq!(snapshot.merge_requests[0].status, WorkflowStatus::Draft);
        assert_eq!(snapshot.stories[0].parent_id, None);
        assert_eq!(snapshot.stories[0].version, 0);
        assert_eq!(snapshot.stories[0].updated_at, None);
        assert!(snapshot.tests.is_empty());
    }

    #[test]
    fn test_assignee_short_form() {
        let yaml = r#"
id: s1
mr_id: mr-1
title: "Pay by card"
assignee: "Jane Doe <jane@example.com>"
"#;

        let story: SnapshotStory = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            story.assignee,
            Some(Assignee {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
            })
        );
    }

    #[test]
    fn test_assignee_map_form_and_null() {
        let yaml = r#"
id: s1
mr_id: mr-1
title: "Pay by card"
assignee:
  name: Jane
  email: jane@example.com
"#;
        let story: SnapshotStory = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(story.assignee.unwrap().name, "Jane");

        let yaml = "id: s1\nmr_id: mr-1\ntitle: x\nassignee: null\n";
        let story: SnapshotStory = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(story.assignee, None);
    }

    #[test]
    fn test_assignee_without_email_is_rejected() {
        let yaml = "id: s1\nmr_id: mr-1\ntitle: x\nassignee: \"Jane\"\n";
        assert!(serde_yaml::from_str::<SnapshotStory>(yaml).is_err());
    }
}
