use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CredentialGroup;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to parse token snapshot: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Failed to serialize token snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Token snapshot is not a JSON object")]
    NotAnObject,
}

/// The persisted state: every credential group, newest first, plus the two
/// knobs when they were changed from their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub token_groups: Vec<CredentialGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_groups: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_hours: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    #[serde(default)]
    token_groups: Value,
    #[serde(default)]
    max_token_groups: Value,
    #[serde(default)]
    retention_hours: Value,
}

impl Snapshot {
    /// Parses a stored snapshot.
    ///
    /// Only a blob that is not a JSON object fails. Groups that cannot be read
    /// are skipped, duplicate identities keep their first occurrence, and knobs
    /// with unusable values are treated as unset.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json).map_err(SnapshotError::Parse)?;

        if !value.is_object() {
            return Err(SnapshotError::NotAnObject);
        }

        let stored = StoredSnapshot::deserialize(value).map_err(SnapshotError::Parse)?;

        let stored_groups = match stored.token_groups {
            Value::Array(groups) => groups,
            Value::Null => Vec::new(),
            other => {
                log::warn!("Ignoring token groups stored as {other}, expected a list");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let mut token_groups = Vec::with_capacity(stored_groups.len());

        for (position, value) in stored_groups.into_iter().enumerate() {
            match serde_json::from_value::<CredentialGroup>(value) {
                Ok(group) if seen.insert(group.identity.clone()) => token_groups.push(group),
                Ok(group) => log::warn!("Skipping duplicate token group {} in snapshot", group.identity),
                Err(err) => log::warn!("Skipping unreadable token group at position {position}: {err}"),
            }
        }

        let max_token_groups = stored
            .max_token_groups
            .as_u64()
            .filter(|max| *max > 0)
            .and_then(|max| usize::try_from(max).ok());

        let retention_hours = stored
            .retention_hours
            .as_f64()
            .filter(|hours| hours.is_finite() && *hours > 0.0);

        Ok(Self {
            token_groups,
            max_token_groups,
            retention_hours,
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Serialize)
    }

    pub fn get(&self, identity: &str) -> Option<&CredentialGroup> {
        self.token_groups.iter().find(|group| group.identity.as_str() == identity)
    }

    /// The raw credential of a group, verbatim, for copying to the clipboard.
    pub fn raw_credential(&self, identity: &str) -> Option<&str> {
        self.get(identity).map(|group| group.raw.as_str())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use jiff::Timestamp;

    use super::*;

    const GROUP: &str = indoc! {r#"
        {
            "identity": "ff8c7b8194da9216",
            "raw": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSIsImV4cCI6OTk5OTk5OTk5OX0.sig",
            "header": { "alg": "HS256", "typ": "JWT" },
            "payload": { "sub": "u1", "exp": 9999999999 },
            "signature": "sig",
            "expiryInstant": "2286-11-20T17:46:39Z",
            "isExpired": false,
            "requests": [
                {
                    "id": "r1",
                    "url": "https://api.example.com/v1/users/1",
                    "method": "GET",
                    "pathSummary": "v1/users/1",
                    "observedAt": 1700000000000
                }
            ],
            "firstSeen": "2023-11-14T22:13:20Z",
            "lastSeen": "2023-11-14T22:13:20.000Z"
        }
    "#};

    #[test]
    fn reads_groups_and_knobs() {
        let json = format!(r#"{{ "tokenGroups": [{GROUP}], "maxTokenGroups": 10, "retentionHours": 1.5 }}"#);
        let snapshot = Snapshot::from_json(&json).unwrap();

        assert_eq!(snapshot.token_groups.len(), 1);
        assert_eq!(snapshot.max_token_groups, Some(10));
        assert_eq!(snapshot.retention_hours, Some(1.5));

        let group = &snapshot.token_groups[0];
        assert_eq!(group.requests[0].observed_at.as_second(), 1_700_000_000);
        assert_eq!(group.last_seen, group.first_seen);
        assert_eq!(group.expiry_instant.map(|exp| exp.as_second()), Some(9_999_999_999));
        assert_eq!(snapshot.raw_credential("ff8c7b8194da9216"), Some(group.raw.as_str()));
        assert_eq!(snapshot.raw_credential("missing"), None);
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        assert_eq!(Snapshot::from_json("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn non_object_blob_fails() {
        assert!(matches!(Snapshot::from_json("not json"), Err(SnapshotError::Parse(_))));
        assert!(matches!(Snapshot::from_json("[]"), Err(SnapshotError::NotAnObject)));
        assert!(matches!(Snapshot::from_json("[[]]"), Err(SnapshotError::NotAnObject)));
        assert!(matches!(Snapshot::from_json("42"), Err(SnapshotError::NotAnObject)));
    }

    #[test]
    fn misshapen_group_list_reads_as_empty() {
        let snapshot = Snapshot::from_json(r#"{ "tokenGroups": "none", "maxTokenGroups": 5 }"#).unwrap();

        assert!(snapshot.token_groups.is_empty());
        assert_eq!(snapshot.max_token_groups, Some(5));
    }

    #[test]
    fn groups_with_mistyped_claims_are_kept() {
        let group = GROUP.replace(r#""payload": { "sub": "u1", "exp": 9999999999 }"#, r#""payload": { "sub": 42, "exp": 9999999999 }"#);
        let snapshot = Snapshot::from_json(&format!(r#"{{ "tokenGroups": [{group}] }}"#)).unwrap();

        assert_eq!(snapshot.token_groups.len(), 1);
        assert_eq!(snapshot.token_groups[0].payload.extra.get("sub"), Some(&Value::from(42)));
    }

    #[test]
    fn unparseable_instants_degrade() {
        let group = GROUP
            .replace(r#""expiryInstant": "2286-11-20T17:46:39Z""#, r#""expiryInstant": "whenever""#)
            .replace(r#""lastSeen": "2023-11-14T22:13:20.000Z""#, r#""lastSeen": false"#);

        let before = Timestamp::now();
        let snapshot = Snapshot::from_json(&format!(r#"{{ "tokenGroups": [{group}] }}"#)).unwrap();
        let group = &snapshot.token_groups[0];

        assert_eq!(group.expiry_instant, None);
        assert!(group.last_seen >= before);
    }

    #[test]
    fn unreadable_and_duplicate_groups_are_skipped() {
        let json = format!(r#"{{ "tokenGroups": [{GROUP}, {{ "identity": 42 }}, {GROUP}] }}"#);
        let snapshot = Snapshot::from_json(&json).unwrap();

        assert_eq!(snapshot.token_groups.len(), 1);
    }

    #[test]
    fn unusable_knobs_are_unset() {
        let snapshot = Snapshot::from_json(r#"{ "maxTokenGroups": -3, "retentionHours": "a day" }"#).unwrap();

        assert_eq!(snapshot.max_token_groups, None);
        assert_eq!(snapshot.retention_hours, None);
    }

    #[test]
    fn serialized_shape() {
        let snapshot = Snapshot::from_json(&format!(r#"{{ "tokenGroups": [{GROUP}], "maxTokenGroups": 10 }}"#)).unwrap();
        let value: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        insta::assert_json_snapshot!(value, @r#"
        {
          "maxTokenGroups": 10,
          "tokenGroups": [
            {
              "expiryInstant": "2286-11-20T17:46:39Z",
              "firstSeen": "2023-11-14T22:13:20Z",
              "header": {
                "alg": "HS256",
                "typ": "JWT"
              },
              "identity": "ff8c7b8194da9216",
              "isExpired": false,
              "lastSeen": "2023-11-14T22:13:20Z",
              "payload": {
                "exp": 9999999999,
                "sub": "u1"
              },
              "raw": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSIsImV4cCI6OTk5OTk5OTk5OX0.sig",
              "requests": [
                {
                  "id": "r1",
                  "method": "GET",
                  "observedAt": "2023-11-14T22:13:20Z",
                  "pathSummary": "v1/users/1",
                  "url": "https://api.example.com/v1/users/1"
                }
              ],
              "signature": "sig"
            }
          ]
        }
        "#);
    }
}
