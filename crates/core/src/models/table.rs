use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A single cell of an input table.
///
/// JSON input is untagged: numbers become `Number`, strings become `Text`
/// and `null` becomes `Null`. `Timestamp` is only produced by callers that
/// already hold parsed datetimes; strings, ISO datetimes included, are
/// parsed later, when the x-axis is normalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    // Before `Timestamp`, so untagged input never picks the datetime arm.
    Text(String),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null) || matches!(self, CellValue::Number(n) if n.is_nan())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

impl From<chrono::NaiveDate> for CellValue {
    fn from(v: chrono::NaiveDate) -> Self {
        CellValue::Timestamp(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Column-oriented tabular data, the raw input of every chart.
///
/// All columns have the same length. The core only ever reads a `Table`;
/// every derived dataset is a fresh owned value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, consuming the table (builder style).
    pub fn with_column<V: Into<CellValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, CoreError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Append a column. Fails on a duplicate name or a length mismatch.
    pub fn push_column<V: Into<CellValue>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), CoreError> {
        let name = name.into();
        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();

        if self.columns.iter().any(|c| c.name == name) {
            return Err(CoreError::ValidationError(format!(
                "Duplicate column name '{name}'"
            )));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(CoreError::ValidationError(format!(
                    "Column '{name}' has {} rows, expected {}",
                    values.len(),
                    first.values.len()
                )));
            }
        }

        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Build a table from a JSON array of flat objects.
    ///
    /// Columns appear in order of first occurrence; keys missing from a
    /// record become `Null`.
    pub fn from_json_records(json: &str) -> Result<Self, CoreError> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;

        let mut names: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let mut table = Table::new();
        for name in names {
            let mut values = Vec::with_capacity(records.len());
            for record in &records {
                let cell = match record.get(&name) {
                    Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                        CoreError::TypeMismatch {
                            field: name.clone(),
                            message: e.to_string(),
                        }
                    })?,
                    None => CellValue::Null,
                };
                values.push(cell);
            }
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, CoreError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::FieldNotFound(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows (0 for a table without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let table = Table::from_json_records(
            r#"[{"date": "2024-01-01", "value": 1.5}, {"date": "2024-02-01", "region": "North"}]"#,
        )
        .unwrap();

        assert_eq!(table.column_names(), vec!["date", "value", "region"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("value").unwrap().values[1], CellValue::Null);
        assert_eq!(
            table.column("region").unwrap().values[1],
            CellValue::Text("North".into())
        );
    }

    #[test]
    fn nan_counts_as_null() {
        assert!(CellValue::Number(f64::NAN).is_null());
        assert!(!CellValue::Number(0.0).is_null());
    }
}
