//! Web Models
//!
//! Form and query payloads accepted by the routes, and the list view they
//! answer with.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use todo_list_lib::commands::{NewFilter, TodoListing};
use todo_list_lib::domain::{Filter, TodoDraft, TodoItem};

/// Body of every page-style response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListView {
    pub filters: Vec<Filter>,
    #[serde(rename = "todoItems")]
    pub todo_items: Vec<TodoItem>,
    pub message: Option<String>,
}

impl ListView {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<TodoListing> for ListView {
    fn from(listing: TodoListing) -> Self {
        Self {
            filters: listing.filters,
            todo_items: listing.items,
            message: None,
        }
    }
}

// ========================
// Forms and Queries
// ========================

#[derive(Debug, Deserialize)]
pub struct AddTodoForm {
    #[serde(rename = "Description", alias = "description", default)]
    pub description: String,
    #[serde(rename = "Category", alias = "category", default)]
    pub category: Option<String>,
}

impl AddTodoForm {
    pub fn into_draft(self) -> TodoDraft {
        TodoDraft::new(self.description, self.category)
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub id: i64,
    #[serde(rename = "isChecked")]
    pub is_checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterNameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFilterForm {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "fromTime")]
    pub from_time: Option<String>,
    #[serde(rename = "toDate")]
    pub to_date: Option<String>,
    #[serde(rename = "toTime")]
    pub to_time: Option<String>,
}

impl AddFilterForm {
    pub fn into_new_filter(self) -> NewFilter {
        NewFilter {
            from_time: combine_date_time(self.from_date.as_deref(), self.from_time.as_deref()),
            to_time: combine_date_time(self.to_date.as_deref(), self.to_time.as_deref()),
            name: self.name.trim().to_string(),
            category: self.category.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Unix seconds for a UTC date (`YYYY-MM-DD`) and time (`HH:MM[:SS]`).
/// `None` unless both halves parse.
pub fn combine_date_time(date: Option<&str>, time: Option<&str>) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let time = time?.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()?;
    Some(NaiveDateTime::new(date, time).and_utc().timestamp())
}
