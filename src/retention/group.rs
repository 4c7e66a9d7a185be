use crate::error::{RetentionError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

const GROUP_CAPTURE: &str = "group";
const ID_CAPTURE: &str = "id";

/// Object-store item with its extracted group and numeric id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedItem {
    pub value: String,
    pub group: String,
    pub id: u64,
}

impl fmt::Display for GroupedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{})", self.value, self.group, self.id)
    }
}

/// Compiled pattern exposing `group` and `id` named captures,
/// e.g. `(?P<group>test)-(?P<id>[0-9]+)`
#[derive(Debug, Clone)]
pub struct GroupPattern {
    regex: Regex,
}

impl GroupPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(RetentionError::config("group pattern is empty"));
        }

        let regex = Regex::new(pattern)?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        if !names.contains(&GROUP_CAPTURE) || !names.contains(&ID_CAPTURE) {
            return Err(RetentionError::config(format!(
                "group pattern '{}' must contain group and id captures",
                pattern
            )));
        }

        Ok(GroupPattern { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Group of an item, `None` when the item doesn't match
    pub fn group_of<'a>(&self, value: &'a str) -> Option<&'a str> {
        self.regex
            .captures(value)
            .and_then(|caps| caps.name(GROUP_CAPTURE))
            .map(|m| m.as_str())
    }

    /// Parse an item that belongs to a group
    fn parse_item(&self, value: &str) -> Result<Option<GroupedItem>> {
        let Some(caps) = self.regex.captures(value) else {
            return Ok(None);
        };
        let Some(group) = caps.name(GROUP_CAPTURE) else {
            return Ok(None);
        };

        let raw_id = caps.name(ID_CAPTURE).map(|m| m.as_str()).unwrap_or_default();
        let id = raw_id.parse::<u64>().map_err(|e| {
            RetentionError::item_id(format!(
                "failed to convert id '{}' of item '{}': {}",
                raw_id, value, e
            ))
        })?;

        Ok(Some(GroupedItem {
            value: value.to_string(),
            group: group.as_str().to_string(),
            id,
        }))
    }
}

/// Keeps the `keep_count` highest ids in each group
#[derive(Debug, Clone)]
pub struct GroupIdRetention {
    pattern: GroupPattern,
    keep_count: usize,
}

impl GroupIdRetention {
    pub fn new(pattern: GroupPattern, keep_count: usize) -> Self {
        GroupIdRetention {
            pattern,
            keep_count,
        }
    }

    pub fn keep_count(&self) -> usize {
        self.keep_count
    }

    /// Number of matching items per group
    pub fn groups<S: AsRef<str>>(&self, items: &[S]) -> BTreeMap<String, usize> {
        let mut groups = BTreeMap::new();

        for item in items {
            if let Some(group) = self.pattern.group_of(item.as_ref()) {
                *groups.entry(group.to_string()).or_insert(0) += 1;
            }
        }

        groups
    }

    /// Items of one group in input order
    ///
    /// # Returns
    /// * `Err` - If any item of the group has an id that is not a non-negative integer
    pub fn group_items<S: AsRef<str>>(
        &self,
        items: &[S],
        group: &str,
    ) -> Result<Vec<GroupedItem>> {
        let mut grouped = Vec::new();

        for item in items {
            let value = item.as_ref();
            if self.pattern.group_of(value) != Some(group) {
                continue;
            }
            if let Some(parsed) = self.pattern.parse_item(value)? {
                grouped.push(parsed);
            }
        }

        Ok(grouped)
    }

    /// Deletable items of one group: everything but the `keep_count` highest ids
    pub fn prune_group<S: AsRef<str>>(
        &self,
        items: &[S],
        group: &str,
    ) -> Result<Vec<GroupedItem>> {
        let mut grouped = self.group_items(items, group)?;

        if grouped.len() <= self.keep_count {
            return Ok(Vec::new());
        }

        // stable: equal ids keep input order
        grouped.sort_by(|a, b| b.id.cmp(&a.id));

        for item in &grouped[..self.keep_count] {
            tracing::info!(item = %item, "keeping");
        }

        Ok(grouped.split_off(self.keep_count))
    }

    /// Deletable items for every group.
    /// A malformed id fails only the group it belongs to.
    pub fn prune<S: AsRef<str>>(
        &self,
        items: &[S],
    ) -> BTreeMap<String, Result<Vec<GroupedItem>>> {
        self.groups(items)
            .into_keys()
            .map(|group| {
                let deletable = self.prune_group(items, &group);
                (group, deletable)
            })
            .collect()
    }
}
