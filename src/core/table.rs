// Table schema enforcement, auto-increment sequencing, projection and paging.
// Rows are validated on every mutation; persisted rows are trusted on reload.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::row::{Filter, Row, RowValues};
use crate::core::types::ColumnType;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_increment: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            auto_increment: false,
        }
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// On-disk form of a table: `{name, columns, rows, nextId}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: usize,
    pub item_count: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
    pub meta: PageMeta,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<ColumnDefinition>,
    rows: Vec<Row>,
    auto_increment: Option<usize>,
    next_id: i64,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Result<Self, Error> {
        let auto_increment = check_schema(&columns)?;
        Ok(Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            auto_increment,
            next_id: 1,
        })
    }

    /// Rebuilds a persisted table. Rows are trusted as written; the schema is not.
    pub fn from_data(data: TableData) -> Result<Self, Error> {
        Self::from_parts(data.name, data.columns, data.rows, data.next_id)
    }

    fn from_parts(
        name: String,
        columns: Vec<ColumnDefinition>,
        rows: Vec<Row>,
        next_id: Option<i64>,
    ) -> Result<Self, Error> {
        let mut table = Self::new(name, columns)?;
        table.rows = rows;
        table.next_id = match next_id {
            Some(next_id) if next_id > 0 => next_id,
            _ => table.derive_next_id(),
        };
        Ok(table)
    }

    pub fn to_data(&self) -> TableData {
        TableData {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            next_id: Some(self.next_id),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn auto_increment_column(&self) -> Option<&ColumnDefinition> {
        self.auto_increment.map(|index| &self.columns[index])
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    /// Validates and appends one row, filling the auto-increment column when omitted.
    /// A rejected row leaves the table, counter included, untouched.
    pub fn insert_row(&mut self, mut raw: RowValues) -> Result<&Row, Error> {
        let mut next_id = self.next_id;
        if let Some(column) = self.auto_increment_column() {
            match raw.get(&column.name) {
                None => {
                    let assigned = next_id;
                    next_id = counter_after(column, assigned)?;
                    raw.insert(column.name.clone(), Value::from(assigned));
                }
                Some(value) => {
                    if let Some(id) = integral_value(value) {
                        if id >= next_id {
                            next_id = counter_after(column, id)?;
                        }
                    }
                }
            }
        }

        let mut values = Map::new();
        for column in &self.columns {
            let Some(value) = raw.get(&column.name) else {
                return Err(Error::new(ErrorKind::SchemaViolation)
                    .with_message(format!("missing value for column \"{}\"", column.name))
                    .with_column(column.name.clone()));
            };
            if !column.column_type.validate(value) {
                return Err(invalid_type(column));
            }
            values.insert(column.name.clone(), value.clone());
        }

        let extra: Vec<&String> = raw
            .keys()
            .filter(|key| self.column(key).is_none())
            .collect();
        if !extra.is_empty() {
            let names = extra.iter().map(|key| key.as_str()).collect::<Vec<_>>();
            return Err(Error::new(ErrorKind::SchemaViolation)
                .with_message(format!("extra fields found: {}", names.join(", ")))
                .with_columns(names));
        }

        let index = self.rows.len();
        self.rows.push(Row::new(values));
        self.next_id = next_id;
        Ok(&self.rows[index])
    }

    /// Removes the first row, in insertion order, matching `filter`.
    pub fn delete_row(&mut self, filter: &Filter) -> bool {
        match self.rows.iter().position(|row| row.matches(filter)) {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }

    /// Applies `values` to every row matching `filter`. With no match this is a no-op
    /// returning 0; otherwise all values are checked before the first row changes.
    pub fn update_rows(&mut self, filter: &Filter, values: &RowValues) -> Result<usize, Error> {
        if !self.rows.iter().any(|row| row.matches(filter)) {
            return Ok(0);
        }
        for (key, value) in values {
            let Some(column) = self.column(key) else {
                return Err(Error::new(ErrorKind::SchemaViolation)
                    .with_message(format!("cannot update unknown column \"{key}\""))
                    .with_column(key.clone()));
            };
            if !column.column_type.validate(value) {
                return Err(invalid_type(column));
            }
        }

        let mut next_id = self.next_id;
        if let Some(column) = self.auto_increment_column() {
            if let Some(id) = values.get(&column.name).and_then(integral_value) {
                if id >= next_id {
                    next_id = counter_after(column, id)?;
                }
            }
        }

        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|row| row.matches(filter)) {
            for (key, value) in values {
                row.set(key.clone(), value.clone());
            }
            updated += 1;
        }
        if updated > 0 {
            self.next_id = next_id;
        }
        Ok(updated)
    }

    /// Projects onto `columns` as a new table named `<name>_projection`.
    pub fn projection<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table, Error> {
        self.projection_named(format!("{}_projection", self.name), columns)
    }

    pub fn projection_named<S: AsRef<str>>(
        &self,
        name: impl Into<String>,
        columns: &[S],
    ) -> Result<Table, Error> {
        let missing: Vec<&str> = columns
            .iter()
            .map(AsRef::as_ref)
            .filter(|column| self.column(column).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::new(ErrorKind::ProjectionColumnMissing)
                .with_message(format!(
                    "projection impossible; column(s) not found: {}",
                    missing.join(", ")
                ))
                .with_columns(missing));
        }

        let mut selected: Vec<ColumnDefinition> = Vec::with_capacity(columns.len());
        for requested in columns.iter().map(AsRef::as_ref) {
            if selected.iter().any(|column| column.name == requested) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("column \"{requested}\" requested more than once"))
                    .with_column(requested));
            }
            if let Some(column) = self.column(requested) {
                selected.push(column.clone());
            }
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = Map::new();
                for column in &selected {
                    let value = row.get(&column.name).cloned().unwrap_or(Value::Null);
                    values.insert(column.name.clone(), value);
                }
                Row::new(values)
            })
            .collect();

        Self::from_parts(name.into(), selected, rows, None)
    }

    /// One page of row copies; `page` is 1-based.
    pub fn page(&self, page: usize, size: usize) -> Result<Page, Error> {
        if page == 0 || size == 0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("page and page size must be at least 1"));
        }
        let total_items = self.rows.len();
        let offset = (page - 1).saturating_mul(size);
        let rows: Vec<Row> = self.rows.iter().skip(offset).take(size).cloned().collect();
        Ok(Page {
            columns: self.columns.clone(),
            meta: PageMeta {
                total_items,
                item_count: rows.len(),
                items_per_page: size,
                total_pages: total_items.div_ceil(size),
                current_page: page,
            },
            rows,
        })
    }

    fn derive_next_id(&self) -> i64 {
        let Some(column) = self.auto_increment_column() else {
            return 1;
        };
        self.rows
            .iter()
            .map(|row| row.get(&column.name).and_then(integral_value).unwrap_or(0))
            .max()
            .map_or(1, |max| max.saturating_add(1).max(1))
    }
}

fn check_schema(columns: &[ColumnDefinition]) -> Result<Option<usize>, Error> {
    for (index, column) in columns.iter().enumerate() {
        if columns[..index].iter().any(|other| other.name == column.name) {
            return Err(Error::new(ErrorKind::SchemaViolation)
                .with_message(format!("duplicate column \"{}\"", column.name))
                .with_column(column.name.clone()));
        }
    }

    let auto: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.auto_increment)
        .map(|(index, _)| index)
        .collect();
    if auto.len() > 1 {
        return Err(Error::new(ErrorKind::MultipleAutoIncrement)
            .with_message("a table may have only one auto-increment column")
            .with_columns(auto.iter().map(|index| columns[*index].name.clone())));
    }
    if let Some(&index) = auto.first() {
        let column = &columns[index];
        if column.column_type != ColumnType::Integer {
            return Err(Error::new(ErrorKind::BadAutoIncrementType)
                .with_message(format!(
                    "auto-increment column \"{}\" must have type integer, not {}",
                    column.name, column.column_type
                ))
                .with_column(column.name.clone()));
        }
    }
    Ok(auto.first().copied())
}

fn invalid_type(column: &ColumnDefinition) -> Error {
    Error::new(ErrorKind::SchemaViolation)
        .with_message(format!(
            "invalid data type for column \"{}\"; expected {}",
            column.name, column.column_type
        ))
        .with_column(column.name.clone())
}

// Counter value following `id`; i64::MAX leaves nothing to hand out next.
fn counter_after(column: &ColumnDefinition, id: i64) -> Result<i64, Error> {
    id.checked_add(1).ok_or_else(|| {
        Error::new(ErrorKind::SchemaViolation)
            .with_message(format!(
                "auto-increment counter exhausted for column \"{}\"",
                column.name
            ))
            .with_column(column.name.clone())
    })
}

// Integer reading of an id value: whole JSON numbers or integer strings.
fn integral_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnDefinition, Table, TableData};
    use crate::core::error::ErrorKind;
    use crate::core::row::RowValues;
    use crate::core::types::ColumnType;
    use serde_json::{Value, json};

    fn values(value: Value) -> RowValues {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn students() -> Table {
        Table::new(
            "students",
            vec![
                ColumnDefinition::new("id", ColumnType::Integer).auto_increment(),
                ColumnDefinition::new("name", ColumnType::String),
                ColumnDefinition::new("course", ColumnType::Integer),
                ColumnDefinition::new("book", ColumnType::ComplexInteger),
            ],
        )
        .expect("table")
    }

    fn seeded() -> Table {
        let mut table = students();
        for (name, course, book) in [("Ann", 3, "101+0i"), ("Bob", 2, "102-5i"), ("Cid", 2, "7i")] {
            table
                .insert_row(values(json!({"name": name, "course": course, "book": book})))
                .expect("insert");
        }
        table
    }

    #[test]
    fn schema_rejects_two_auto_increment_columns() {
        let err = Table::new(
            "t",
            vec![
                ColumnDefinition::new("a", ColumnType::Integer).auto_increment(),
                ColumnDefinition::new("b", ColumnType::Integer).auto_increment(),
            ],
        )
        .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::MultipleAutoIncrement);
        assert_eq!(err.columns(), ["a", "b"]);
    }

    #[test]
    fn schema_rejects_non_integer_auto_increment() {
        let err = Table::new(
            "t",
            vec![ColumnDefinition::new("a", ColumnType::Real).auto_increment()],
        )
        .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::BadAutoIncrementType);
    }

    #[test]
    fn schema_rejects_duplicate_columns() {
        let err = Table::new(
            "t",
            vec![
                ColumnDefinition::new("a", ColumnType::Integer),
                ColumnDefinition::new("a", ColumnType::String),
            ],
        )
        .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let table = seeded();
        let ids: Vec<&Value> = table.rows().iter().map(|row| row.get("id").expect("id")).collect();
        assert_eq!(ids, [&json!(1), &json!(2), &json!(3)]);
        assert_eq!(table.next_id(), 4);
    }

    #[test]
    fn supplied_id_advances_counter() {
        let mut table = seeded();
        table
            .insert_row(values(json!({"id": 10, "name": "Dan", "course": 1, "book": "1"})))
            .expect("insert");
        let row = table
            .insert_row(values(json!({"name": "Eve", "course": 1, "book": "2"})))
            .expect("insert");
        assert_eq!(row.get("id"), Some(&json!(11)));

        // A lower explicit id is stored as-is and leaves the counter alone.
        table
            .insert_row(values(json!({"id": 5, "name": "Fay", "course": 1, "book": "3"})))
            .expect("insert");
        assert_eq!(table.next_id(), 12);
    }

    #[test]
    fn insert_missing_column_names_it() {
        let mut table = seeded();
        let err = table
            .insert_row(values(json!({"name": "Dan", "book": "1"})))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.columns(), ["course"]);
        assert!(err.message().expect("message").contains("missing value"));
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.next_id(), 4);
    }

    #[test]
    fn insert_invalid_type_names_column_and_type() {
        let mut table = seeded();
        let err = table
            .insert_row(values(json!({"name": "Dan", "course": 1.5, "book": "1"})))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.columns(), ["course"]);
        assert!(err.message().expect("message").contains("expected integer"));
    }

    #[test]
    fn insert_extra_fields_lists_every_key() {
        let mut table = seeded();
        let err = table
            .insert_row(values(json!({
                "name": "Dan", "course": 1, "book": "1", "age": 20, "email": "d@x"
            })))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.columns(), ["age", "email"]);
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn stored_rows_follow_schema_order() {
        let mut table = students();
        let row = table
            .insert_row(values(json!({"book": "1", "course": 1, "name": "Ann"})))
            .expect("insert");
        assert_eq!(row.columns().collect::<Vec<_>>(), ["id", "name", "course", "book"]);
    }

    #[test]
    fn delete_removes_only_first_match() {
        let mut table = seeded();
        assert!(table.delete_row(&values(json!({"course": "2"}))));
        let names: Vec<&Value> = table.rows().iter().map(|row| row.get("name").expect("name")).collect();
        assert_eq!(names, [&json!("Ann"), &json!("Cid")]);
        assert!(!table.delete_row(&values(json!({"name": "Zed"}))));
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn update_changes_every_match() {
        let mut table = seeded();
        let updated = table
            .update_rows(&values(json!({"course": 2})), &values(json!({"book": "9-9i"})))
            .expect("update");
        assert_eq!(updated, 2);
        assert_eq!(table.rows()[0].get("book"), Some(&json!("101+0i")));
        assert_eq!(table.rows()[1].get("book"), Some(&json!("9-9i")));
        assert_eq!(table.rows()[2].get("book"), Some(&json!("9-9i")));

        let none = table
            .update_rows(&values(json!({"name": "Zed"})), &values(json!({"course": 4})))
            .expect("update");
        assert_eq!(none, 0);
    }

    #[test]
    fn update_validates_before_touching_rows() {
        let mut table = seeded();
        let before = table.clone();
        let err = table
            .update_rows(
                &values(json!({"course": 2})),
                &values(json!({"name": "Zed", "course": "two"})),
            )
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.columns(), ["course"]);
        assert_eq!(table, before);

        let err = table
            .update_rows(&values(json!({"course": 2})), &values(json!({"age": 3})))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.message().expect("message").contains("unknown column"));
        assert_eq!(table, before);
    }

    #[test]
    fn update_of_id_keeps_counter_ahead() {
        let mut table = seeded();
        table
            .update_rows(&values(json!({"name": "Cid"})), &values(json!({"id": 40})))
            .expect("update");
        let row = table
            .insert_row(values(json!({"name": "Dan", "course": 1, "book": "1"})))
            .expect("insert");
        assert_eq!(row.get("id"), Some(&json!(41)));
    }

    #[test]
    fn update_without_match_is_a_noop() {
        let mut table = seeded();
        let before = table.clone();
        let updated = table
            .update_rows(&values(json!({"name": "Zed"})), &values(json!({"course": "two"})))
            .expect("update");
        assert_eq!(updated, 0);
        assert_eq!(table, before);
    }

    #[test]
    fn supplied_max_id_exhausts_counter_without_mutation() {
        let mut table = seeded();
        let before = table.clone();
        let err = table
            .insert_row(values(json!({"id": i64::MAX, "name": "Dan", "course": 1, "book": "1"})))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.columns(), ["id"]);
        assert!(err.message().expect("message").contains("exhausted"));
        assert_eq!(table, before);

        let err = table
            .update_rows(&values(json!({"name": "Cid"})), &values(json!({"id": i64::MAX})))
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(table, before);

        let row = table
            .insert_row(values(json!({"id": i64::MAX - 1, "name": "Eve", "course": 1, "book": "1"})))
            .expect("insert");
        assert_eq!(row.get("id"), Some(&json!(i64::MAX - 1)));
        assert_eq!(table.next_id(), i64::MAX);
    }

    #[test]
    fn reloaded_counter_at_max_rejects_new_ids() {
        let from_rows: TableData = serde_json::from_value(json!({
            "name": "t",
            "columns": [
                {"name": "id", "type": "integer", "autoIncrement": true},
                {"name": "label", "type": "string"}
            ],
            "rows": [{"id": i64::MAX, "label": "a"}]
        }))
        .expect("decode");
        let explicit: TableData = serde_json::from_value(json!({
            "name": "t",
            "columns": [
                {"name": "id", "type": "integer", "autoIncrement": true},
                {"name": "label", "type": "string"}
            ],
            "nextId": i64::MAX
        }))
        .expect("decode");

        for data in [from_rows, explicit] {
            let mut table = Table::from_data(data).expect("table");
            assert_eq!(table.next_id(), i64::MAX);
            let rows = table.rows().len();
            let err = table
                .insert_row(values(json!({"label": "b"})))
                .expect_err("err");
            assert_eq!(err.kind(), ErrorKind::SchemaViolation);
            assert_eq!(table.rows().len(), rows);
            assert_eq!(table.next_id(), i64::MAX);
        }
    }

    #[test]
    fn projection_copies_requested_columns_in_request_order() {
        let table = seeded();
        let mut projected = table.projection(&["name", "id"]).expect("projection");
        assert_eq!(projected.name(), "students_projection");
        let names: Vec<&str> = projected.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["name", "id"]);
        for (source, copy) in table.rows().iter().zip(projected.rows()) {
            assert_eq!(copy.columns().collect::<Vec<_>>(), ["name", "id"]);
            assert_eq!(copy.get("name"), source.get("name"));
            assert_eq!(copy.get("id"), source.get("id"));
        }

        projected
            .update_rows(&values(json!({"id": 1})), &values(json!({"name": "Changed"})))
            .expect("update");
        assert!(projected.delete_row(&values(json!({"id": 2}))));
        assert_eq!(table.rows()[0].get("name"), Some(&json!("Ann")));
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn projection_counter_is_derived_from_its_rows() {
        let table = seeded();
        let mut projected = table.projection_named("ids", &["id", "name"]).expect("projection");
        assert_eq!(projected.name(), "ids");
        assert_eq!(projected.next_id(), 4);
        let row = projected
            .insert_row(values(json!({"name": "Dan"})))
            .expect("insert");
        assert_eq!(row.get("id"), Some(&json!(4)));

        let without_id = table.projection(&["name"]).expect("projection");
        assert!(without_id.auto_increment_column().is_none());
    }

    #[test]
    fn projection_names_exactly_the_missing_columns() {
        let table = seeded();
        let err = table
            .projection(&["zeta", "name", "alpha"])
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::ProjectionColumnMissing);
        assert_eq!(err.columns(), ["zeta", "alpha"]);
        assert!(err.message().expect("message").ends_with("zeta, alpha"));

        let err = table.projection(&["name", "name"]).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn from_data_derives_counter_from_rows() {
        let data: TableData = serde_json::from_value(json!({
            "name": "t",
            "columns": [
                {"name": "id", "type": "integer", "autoIncrement": true},
                {"name": "label", "type": "string"}
            ],
            "rows": [{"id": 7, "label": "a"}, {"id": 3, "label": "b"}]
        }))
        .expect("decode");
        let table = Table::from_data(data).expect("table");
        assert_eq!(table.next_id(), 8);

        let explicit: TableData = serde_json::from_value(json!({
            "name": "t",
            "columns": [{"name": "id", "type": "integer", "autoIncrement": true}],
            "rows": [],
            "nextId": 20
        }))
        .expect("decode");
        assert_eq!(Table::from_data(explicit).expect("table").next_id(), 20);

        let empty: TableData = serde_json::from_value(json!({
            "name": "t",
            "columns": [{"name": "id", "type": "integer", "autoIncrement": true}]
        }))
        .expect("decode");
        assert_eq!(Table::from_data(empty).expect("table").next_id(), 1);
    }

    #[test]
    fn to_data_encodes_persisted_shape() {
        let table = seeded();
        let encoded = serde_json::to_value(table.to_data()).expect("encode");
        assert_eq!(encoded["name"], json!("students"));
        assert_eq!(
            encoded["columns"][0],
            json!({"name": "id", "type": "integer", "autoIncrement": true})
        );
        assert_eq!(encoded["columns"][3], json!({"name": "book", "type": "complexInteger"}));
        assert_eq!(
            encoded["rows"][1],
            json!({"id": 2, "name": "Bob", "course": 2, "book": "102-5i"})
        );
        assert_eq!(encoded["nextId"], json!(4));
    }

    #[test]
    fn page_slices_and_reports_meta() {
        let mut table = students();
        for index in 0..5 {
            table
                .insert_row(values(json!({"name": format!("n{index}"), "course": 1, "book": "1"})))
                .expect("insert");
        }
        let page = table.page(2, 2).expect("page");
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].get("id"), Some(&json!(3)));
        assert_eq!(page.meta.total_items, 5);
        assert_eq!(page.meta.item_count, 2);
        assert_eq!(page.meta.items_per_page, 2);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.current_page, 2);

        let last = table.page(3, 2).expect("page");
        assert_eq!(last.meta.item_count, 1);
        let past = table.page(9, 2).expect("page");
        assert!(past.rows.is_empty());

        let err = table.page(0, 2).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
