//! Tracked work items (tickets) that sessions can be matched against.

use serde::Deserialize;

use crate::record::PayloadError;
use crate::types::TicketKey;

/// A ticket from the issue tracker. Read-only during matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub key: TicketKey,
    pub summary: String,
    pub description: String,
    pub status: String,
    pub project: String,
    /// Issue type, e.g. "Bug" or "Story".
    pub category: String,
    pub priority: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub assignee: Option<String>,
}

impl TrackedItem {
    /// Creates an item with only a key and summary set.
    pub fn new(key: TicketKey, summary: impl Into<String>) -> Self {
        Self {
            key,
            summary: summary.into(),
            description: String::new(),
            status: String::new(),
            project: String::new(),
            category: String::new(),
            priority: String::new(),
            labels: Vec::new(),
            components: Vec::new(),
            assignee: None,
        }
    }

    /// All free text used for keyword hits, lower-cased.
    pub fn match_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.summary,
            self.description,
            self.labels.join(" "),
            self.components.join(" ")
        )
        .to_lowercase()
    }
}

/// `{"name": ...}` objects used throughout the Jira field schema.
#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Person {
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JiraFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<Named>,
    #[serde(default)]
    project: Option<Named>,
    #[serde(default)]
    issuetype: Option<Named>,
    #[serde(default)]
    priority: Option<Named>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    components: Option<Vec<Named>>,
    #[serde(default)]
    assignee: Option<Person>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    fields: Option<JiraFields>,
}

fn name_of(named: Option<Named>) -> String {
    named.and_then(|n| n.name).unwrap_or_default()
}

/// Extract plain text from a description, which is a string in API v2
/// and a rich-text document in v3.
fn description_text(value: Option<serde_json::Value>) -> String {
    fn collect(value: &serde_json::Value, out: &mut Vec<String>) {
        match value {
            serde_json::Value::String(s) => out.push(s.clone()),
            serde_json::Value::Object(map) => {
                if let Some(serde_json::Value::String(text)) = map.get("text") {
                    out.push(text.clone());
                }
                if let Some(content) = map.get("content") {
                    collect(content, out);
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    collect(item, out);
                }
            }
            _ => {}
        }
    }

    let mut parts = Vec::new();
    if let Some(value) = value {
        collect(&value, &mut parts);
    }
    parts.join(" ")
}

fn parse_key(key: String) -> Option<TicketKey> {
    match TicketKey::new(key) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!(error = %e, "skipping issue without a key");
            None
        }
    }
}

impl JiraIssue {
    fn into_item(self) -> Option<TrackedItem> {
        let key = parse_key(self.key.unwrap_or_default())?;
        let fields = self.fields.unwrap_or_default();

        Some(TrackedItem {
            key,
            summary: fields.summary.unwrap_or_default(),
            description: description_text(fields.description),
            status: name_of(fields.status),
            project: name_of(fields.project),
            category: name_of(fields.issuetype),
            priority: name_of(fields.priority),
            labels: fields.labels.unwrap_or_default(),
            components: fields
                .components
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| c.name)
                .collect(),
            assignee: fields.assignee.and_then(|a| a.display_name),
        })
    }
}

/// Wire shape of a flat item. Any field may be missing or null.
#[derive(Debug, Deserialize)]
struct FlatItem {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default, alias = "issue_type")]
    category: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    components: Option<Vec<String>>,
    #[serde(default)]
    assignee: Option<String>,
}

impl FlatItem {
    fn into_item(self) -> Option<TrackedItem> {
        let key = parse_key(self.key.unwrap_or_default())?;

        Some(TrackedItem {
            key,
            summary: self.summary.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            project: self.project.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            labels: self.labels.unwrap_or_default(),
            components: self.components.unwrap_or_default(),
            assignee: self.assignee,
        })
    }
}

/// Ticket payloads: a Jira search response, a `data` wrapper, or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TicketsPayload {
    Search { issues: Vec<JiraIssue> },
    Wrapped { data: Vec<FlatItem> },
    List(Vec<FlatItem>),
}

/// Decode a ticket payload in any of the accepted shapes.
pub fn decode_tickets(json: &str) -> Result<Vec<TrackedItem>, PayloadError> {
    let items = match serde_json::from_str::<TicketsPayload>(json)? {
        TicketsPayload::Search { issues } => {
            issues.into_iter().filter_map(JiraIssue::into_item).collect()
        }
        TicketsPayload::Wrapped { data: items } | TicketsPayload::List(items) => {
            items.into_iter().filter_map(FlatItem::into_item).collect()
        }
    };
    Ok(items)
}

/// Keep items whose status is one of `statuses` (case-insensitive).
///
/// An empty status list keeps everything.
pub fn filter_by_status(items: Vec<TrackedItem>, statuses: &[String]) -> Vec<TrackedItem> {
    if statuses.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| statuses.iter().any(|s| s.eq_ignore_ascii_case(&item.status)))
        .collect()
}

/// Keep items assigned to `assignee` (case-insensitive).
pub fn filter_by_assignee(items: Vec<TrackedItem>, assignee: &str) -> Vec<TrackedItem> {
    items
        .into_iter()
        .filter(|item| {
            item.assignee
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(assignee))
        })
        .collect()
}
