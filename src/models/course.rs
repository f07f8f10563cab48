//! Course record.

use serde::{Deserialize, Serialize};

/// A course and the textbooks it requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,

    #[serde(default, alias = "Course Name")]
    pub course_name: String,

    /// Teacher's email
    #[serde(default)]
    pub teacher: String,

    /// Required textbook titles
    #[serde(default)]
    pub textbooks: Vec<String>,
}
