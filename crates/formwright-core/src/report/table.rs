use crate::model::{FieldDefinition, ResponseRecord};
use chrono::{Local, TimeZone};
use serde::Serialize;

pub const MISSING_CELL: &str = "-";
pub const CHECKED_CELL: &str = "✅";
pub const UNCHECKED_CELL: &str = "❌";

/// The response log laid out for display: one row per record, one column
/// per non-title field in schema order.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResponseTable {
    pub fn build(schema: &[FieldDefinition], records: &[ResponseRecord]) -> Self {
        let columns: Vec<&FieldDefinition> = schema.iter().filter(|f| !f.is_title()).collect();

        let mut headers = vec!["#".to_string(), "Timestamp".to_string()];
        headers.extend(columns.iter().map(|f| f.label.clone()));

        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let mut row = vec![(idx + 1).to_string(), format_timestamp(r.timestamp)];
                row.extend(columns.iter().map(|f| format_cell(r.data.get(&f.id))));
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fixed-width text rendering; width is measured in chars.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "No responses saved yet.\n".to_string();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = format!("Saved Responses ({})\n", self.rows.len());
        out.push_str(&render_line(&self.headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&render_line(&rule, &widths));
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| {
            let pad = w.saturating_sub(c.chars().count());
            format!("{}{}", c, " ".repeat(pad))
        })
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

pub fn format_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None => MISSING_CELL.to_string(),
        Some(serde_json::Value::Bool(true)) => CHECKED_CELL.to_string(),
        Some(serde_json::Value::Bool(false)) => UNCHECKED_CELL.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, FormData};
    use serde_json::json;

    #[test]
    fn test_columns_follow_schema_and_skip_titles() {
        let mut title = FieldDefinition::new(FieldType::Title);
        title.label = "Heading".into();
        let mut name = FieldDefinition::new(FieldType::Text);
        name.label = "Name".into();
        let mut agree = FieldDefinition::new(FieldType::Checkbox);
        agree.label = "Agree".into();
        let mut color = FieldDefinition::new(FieldType::Radio);
        color.label = "Color".into();

        let mut data = FormData::new();
        data.insert(name.id.clone(), json!("Ada"));
        data.insert(agree.id.clone(), json!(true));
        let records = vec![
            ResponseRecord {
                timestamp: 0,
                data,
            },
            ResponseRecord {
                timestamp: 0,
                data: FormData::from([(agree.id.clone(), json!(false))]),
            },
        ];

        let schema = vec![title, name, agree, color];
        let table = ResponseTable::build(&schema, &records);
        assert_eq!(table.headers, ["#", "Timestamp", "Name", "Agree", "Color"]);
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[0][2..], ["Ada", "✅", "-"]);
        assert_eq!(table.rows[1][2..], ["-", "❌", "-"]);
    }

    #[test]
    fn test_empty_log_message() {
        let table = ResponseTable::build(&[], &[]);
        assert_eq!(table.render(), "No responses saved yet.\n");
    }

    #[test]
    fn test_other_values_render_as_json() {
        assert_eq!(format_cell(Some(&json!(3))), "3");
        assert_eq!(format_cell(Some(&json!(["a"]))), "[\"a\"]");
    }
}
