use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub const HASH_COLUMNS: usize = 31;
pub const HASH_WIDTH: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ColumnType {
    /// SQL `timestamp`, formatted `%Y-%m-%d %H:%M:%S`.
    Timestamp,
    /// SQL `char(width)`, exactly `width` hex characters.
    FixedHex { width: usize },
    /// SQL `varchar(width)`.
    Text { width: usize },
    /// SQL `bigint`.
    BigInt,
}

impl ColumnType {
    pub fn sql_type(&self) -> String {
        match self {
            Self::Timestamp => "timestamp".to_string(),
            Self::FixedHex { width } => format!("char({})", width),
            Self::Text { width } => format!("varchar({})", width),
            Self::BigInt => "bigint".to_string(),
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp => f.write_str("timestamp"),
            Self::FixedHex { width } => write!(f, "hex({})", width),
            Self::Text { width } => write!(f, "text({})", width),
            Self::BigInt => f.write_str("bigint"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Describes one target table: ordered typed columns, keyed by the first
/// column. Built once at startup and read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schema {
    table: String,
    columns: Vec<Column>,
    primary_key: bool,
    partition: Option<String>,
}

impl Schema {
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Self {
        assert!(!columns.is_empty(), "a schema needs at least one column");
        Self {
            table: table.into(),
            columns,
            primary_key: false,
            partition: None,
        }
    }

    /// Declares the first column as the table's primary key.
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Declares the table a hypertable partitioned by range on `column`.
    pub fn with_partition(mut self, column: &str) -> Self {
        self.partition = Some(column.to_string());
        self
    }

    /// Same descriptor against a different table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// The `timestamp,hash_1..hash_31` shape written by the generator:
    /// a zero-padded hex counter key plus 31 truncated SHA-256 columns.
    pub fn block() -> Self {
        let mut columns = vec![Column::new(
            "timestamp",
            ColumnType::FixedHex { width: HASH_WIDTH },
        )];
        for i in 1..=HASH_COLUMNS {
            columns.push(Column::new(
                format!("hash_{}", i),
                ColumnType::FixedHex { width: HASH_WIDTH },
            ));
        }
        Self::new("block", columns).with_primary_key()
    }

    /// The 4-field wallet transfer shape, partitioned by time range.
    pub fn bitcoin_transactions() -> Self {
        Self::new(
            "bitcoin_transactions",
            vec![
                Column::new("timestamp", ColumnType::Timestamp),
                Column::new("source", ColumnType::Text { width: 63 }),
                Column::new("destination", ColumnType::Text { width: 63 }),
                Column::new("satoshi", ColumnType::BigInt),
            ],
        )
        .with_partition("timestamp")
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    pub fn key_column(&self) -> &Column {
        &self.columns[0]
    }

    pub fn partition(&self) -> Option<&str> {
        self.partition.as_deref()
    }

    pub fn header(&self) -> String {
        self.column_list()
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn create_table_sql(&self) -> String {
        let mut definitions = Vec::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            let mut definition =
                format!("{} {} NOT NULL", column.name, column.column_type.sql_type());
            if i == 0 && self.primary_key {
                definition.push_str(" PRIMARY KEY");
            }
            definitions.push(definition);
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.table,
            definitions.join(",\n    ")
        )
    }

    pub fn create_hypertable_sql(&self) -> Option<String> {
        self.partition.as_ref().map(|column| {
            format!(
                "SELECT * FROM create_hypertable('{}', by_range('{}'), if_not_exists => TRUE, migrate_data => TRUE)",
                self.table, column
            )
        })
    }

    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.column_list(),
            placeholders
        )
    }

    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.column_list(),
            self.table,
            self.key_column().name
        )
    }

    pub fn select_latest_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {} DESC LIMIT $1",
            self.column_list(),
            self.table,
            self.key_column().name
        )
    }

    pub fn select_random_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY random() LIMIT 1",
            self.column_list(),
            self.table
        )
    }

    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.table)
    }
}
