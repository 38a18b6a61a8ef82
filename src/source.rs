use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::ir::{CellValue, ColumnRole, DataTable, EmployeeRecord, LabelledValue, SelectionKey};

/// Reasons the chart cannot be started from the bound data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Add a field to Employee ID to start the chart")]
    MissingEmployeeId,
    #[error("Add a field to Manager ID to start the chart")]
    MissingManagerId,
    #[error("The data set is empty")]
    EmptyDataset,
    #[error("No row has a non-empty employee id")]
    NoEmployeeIds,
}

/// Thousands/decimal separators for metric formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub group: &'static str,
    pub decimal: &'static str,
}

impl NumberLocale {
    pub const EN_US: NumberLocale = NumberLocale {
        group: ",",
        decimal: ".",
    };

    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        match normalized.as_str() {
            "de-de" | "de" | "es-es" | "es" | "it-it" | "it" | "nl-nl" | "nl" | "pt-br" => {
                NumberLocale {
                    group: ".",
                    decimal: ",",
                }
            }
            "fr-fr" | "fr" | "sv-se" | "sv" => NumberLocale {
                group: "\u{202f}",
                decimal: ",",
            },
            "de-ch" => NumberLocale {
                group: "\u{2019}",
                decimal: ".",
            },
            _ => Self::EN_US,
        }
    }

    /// Group the integer part and keep at most three fraction digits.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let rounded = (value * 1000.0).round() / 1000.0;
        let negative = rounded < 0.0;
        let text = format!("{:.3}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::new();
        for (idx, ch) in digits.iter().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push_str(self.group);
            }
            grouped.push(*ch);
        }

        let mut out = String::new();
        if negative && (grouped != "0" || !frac_part.is_empty()) {
            out.push('-');
        }
        out.push_str(&grouped);
        if !frac_part.is_empty() {
            out.push_str(self.decimal);
            out.push_str(frac_part);
        }
        out
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN_US
    }
}

struct RoleColumns {
    employee_id: usize,
    manager_id: usize,
    display_name: Option<usize>,
    title: Option<usize>,
    department: Option<usize>,
    image_url: Option<usize>,
    details: Vec<usize>,
    metrics: Vec<usize>,
    tooltips: Vec<usize>,
}

impl RoleColumns {
    fn resolve(table: &DataTable) -> Result<Self, BindingError> {
        let employee_id = table
            .column_for(ColumnRole::EmployeeId)
            .ok_or(BindingError::MissingEmployeeId)?;
        let manager_id = table
            .column_for(ColumnRole::ManagerId)
            .ok_or(BindingError::MissingManagerId)?;
        Ok(Self {
            employee_id,
            manager_id,
            display_name: table.column_for(ColumnRole::DisplayName),
            title: table.column_for(ColumnRole::Title),
            department: table.column_for(ColumnRole::Department),
            image_url: table.column_for(ColumnRole::ImageUrl),
            details: table.columns_for(ColumnRole::Details),
            metrics: table.columns_for(ColumnRole::Metric),
            tooltips: table.columns_for(ColumnRole::Tooltips),
        })
    }
}

fn cell(row: &[CellValue], idx: Option<usize>) -> Option<&CellValue> {
    idx.and_then(|idx| row.get(idx))
}

fn text_at(row: &[CellValue], idx: Option<usize>) -> Option<String> {
    cell(row, idx).and_then(CellValue::to_text)
}

fn labelled_values(
    table: &DataTable,
    row: &[CellValue],
    columns: &[usize],
    locale: Option<&NumberLocale>,
) -> Vec<LabelledValue> {
    let mut values = Vec::new();
    for &idx in columns {
        let Some(value) = row.get(idx) else {
            continue;
        };
        let text = match (locale, value.as_number()) {
            (Some(locale), Some(number)) => Some(locale.format(number)),
            _ => value.to_text(),
        };
        let Some(text) = text else {
            continue;
        };
        values.push(LabelledValue {
            label: table.columns[idx].name.clone(),
            value: text,
        });
    }
    values
}

/// Normalize host rows into one record per distinct employee id.
///
/// Duplicate ids keep the slot of their first row and the content of their
/// last row.
pub fn normalize_rows(
    table: &DataTable,
    locale: &NumberLocale,
) -> Result<Vec<EmployeeRecord>, BindingError> {
    let roles = RoleColumns::resolve(table)?;
    if table.rows.is_empty() {
        return Err(BindingError::EmptyDataset);
    }

    let mut records: Vec<EmployeeRecord> = Vec::with_capacity(table.rows.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let Some(id) = text_at(row, Some(roles.employee_id)) else {
            debug!(row_index, "skipping row without employee id");
            continue;
        };
        let parent_id = text_at(row, Some(roles.manager_id));
        let display_name = text_at(row, roles.display_name).unwrap_or_else(|| id.clone());
        let record = EmployeeRecord {
            selection_key: SelectionKey::for_row(row_index, &id),
            id: id.clone(),
            parent_id,
            display_name,
            title: text_at(row, roles.title),
            division: text_at(row, roles.department),
            avatar_url: text_at(row, roles.image_url),
            details: labelled_values(table, row, &roles.details, None),
            metrics: labelled_values(table, row, &roles.metrics, Some(locale)),
            tooltips: labelled_values(table, row, &roles.tooltips, None),
            highlighted: false,
            row_index,
        };

        match slots.get(&id) {
            Some(&slot) => {
                debug!(id = %id, row_index, "duplicate employee id, later row wins");
                records[slot] = record;
            }
            None => {
                slots.insert(id, records.len());
                records.push(record);
            }
        }
    }

    if records.is_empty() {
        return Err(BindingError::NoEmployeeIds);
    }
    Ok(records)
}
