use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role a host column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    EmployeeId,
    ManagerId,
    DisplayName,
    Title,
    Department,
    ImageUrl,
    Details,
    Metric,
    Tooltips,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<ColumnRole>,
}

impl Column {
    pub fn new(name: &str, roles: &[ColumnRole]) -> Self {
        Self {
            name: name.to_string(),
            roles: roles.to_vec(),
        }
    }

    pub fn has_role(&self, role: ColumnRole) -> bool {
        self.roles.contains(&role)
    }
}

/// A raw cell as delivered by the host data view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Stringified, trimmed cell; blank and null collapse to `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::Number(value) => {
                if !value.is_finite() {
                    return None;
                }
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    Some(format!("{}", *value as i64))
                } else {
                    Some(format!("{value}"))
                }
            }
            CellValue::Text(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Tabular input: column metadata plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn column_for(&self, role: ColumnRole) -> Option<usize> {
        self.columns.iter().position(|col| col.has_role(role))
    }

    pub fn columns_for(&self, role: ColumnRole) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.has_role(role))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Opaque identity of a source row, used for cross-panel selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionKey(String);

impl SelectionKey {
    pub fn for_row(row_index: usize, id: &str) -> Self {
        Self(format!("row{row_index}:{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledValue {
    pub label: String,
    pub value: String,
}

impl LabelledValue {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub display_name: String,
    pub title: Option<String>,
    pub division: Option<String>,
    pub avatar_url: Option<String>,
    pub details: Vec<LabelledValue>,
    pub metrics: Vec<LabelledValue>,
    pub tooltips: Vec<LabelledValue>,
    pub selection_key: SelectionKey,
    pub highlighted: bool,
    pub row_index: usize,
}

impl EmployeeRecord {
    /// Minimal record; used by tests and by hosts that build records directly.
    pub fn new(id: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            parent_id: parent_id.map(|p| p.to_string()),
            display_name: id.to_string(),
            title: None,
            division: None,
            avatar_url: None,
            details: Vec::new(),
            metrics: Vec::new(),
            tooltips: Vec::new(),
            selection_key: SelectionKey::for_row(0, id),
            highlighted: false,
            row_index: 0,
        }
    }

    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "vertical" | "tb" | "td" => Some(Self::Vertical),
            "horizontal" | "lr" => Some(Self::Horizontal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_collapses_blank_and_null() {
        assert_eq!(CellValue::Null.to_text(), None);
        assert_eq!(CellValue::Text("   ".into()).to_text(), None);
        assert_eq!(CellValue::Text(" 42 ".into()).to_text(), Some("42".into()));
        assert_eq!(CellValue::Number(1001.0).to_text(), Some("1001".into()));
        assert_eq!(CellValue::Number(0.0).to_text(), Some("0".into()));
        assert_eq!(CellValue::Number(2.5).to_text(), Some("2.5".into()));
        assert_eq!(CellValue::Bool(false).to_text(), Some("false".into()));
    }

    #[test]
    fn table_deserializes_mixed_cells() {
        let raw = r#"{
            "columns": [
                {"name": "Id", "roles": ["employeeId"]},
                {"name": "Manager", "roles": ["managerId"]},
                {"name": "Headcount", "roles": ["metric"]}
            ],
            "rows": [["1", null, 12], ["2", "1", 3.5]]
        }"#;
        let table: DataTable = serde_json::from_str(raw).unwrap();
        assert_eq!(table.column_for(ColumnRole::ManagerId), Some(1));
        assert_eq!(table.rows[0][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Number(3.5));
    }

    #[test]
    fn initials_take_two_words() {
        let mut record = EmployeeRecord::new("7", None);
        record.display_name = "ada king lovelace".into();
        assert_eq!(record.initials(), "AK");
    }
}
