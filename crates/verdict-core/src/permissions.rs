//! Case-insensitive permission matching
//!
//! Permission names are compared after lower-casing, so a grant of `"Read"`
//! satisfies a requirement of `"read"`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn normalize(permission: &str) -> String {
    permission.to_lowercase()
}

/// Required permissions that the caller has not been granted
///
/// Entries keep their declared spelling and order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingPermissions(Vec<String>);

impl MissingPermissions {
    /// Compute `required - granted` under case-insensitive comparison
    pub fn compute<R, G>(required: &[R], granted: &[G]) -> Self
    where
        R: AsRef<str>,
        G: AsRef<str>,
    {
        let granted: HashSet<String> = granted.iter().map(|g| normalize(g.as_ref())).collect();

        Self(
            required
                .iter()
                .map(AsRef::as_ref)
                .filter(|r| !granted.contains(&normalize(r)))
                .map(str::to_string)
                .collect(),
        )
    }

    /// Normalize a list reported by the evaluation engine
    ///
    /// Engines report missing permissions as a set, which loses the declared
    /// order. With `declared` available the result follows declared order and
    /// spelling; otherwise the reported order is kept and case-insensitive
    /// duplicates are dropped.
    pub fn normalize(reported: Vec<String>, declared: Option<&[String]>) -> Self {
        match declared {
            Some(declared) => {
                let reported: HashSet<String> = reported.iter().map(|r| normalize(r)).collect();
                let mut seen = HashSet::new();
                Self(
                    declared
                        .iter()
                        .filter(|d| {
                            let key = normalize(d);
                            reported.contains(&key) && seen.insert(key)
                        })
                        .cloned()
                        .collect(),
                )
            }
            None => {
                let mut seen = HashSet::new();
                Self(
                    reported
                        .into_iter()
                        .filter(|r| seen.insert(normalize(r)))
                        .collect(),
                )
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for MissingPermissions {
    fn from(permissions: Vec<String>) -> Self {
        Self(permissions)
    }
}

impl PartialEq<Vec<&str>> for MissingPermissions {
    fn eq(&self, other: &Vec<&str>) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}
