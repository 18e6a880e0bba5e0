use std::fmt::{self, Display};
use std::time::Duration;

use postgres::{Client, Config, NoTls, Row, Statement};

use crate::bind::bind;
use crate::error::{print_error, ConnectionErr, SchemaErr, StatementErr};
use crate::record::{FieldValue, Record};
use crate::schema::{ColumnType, Schema};

/// Bounds connection establishment and, via `statement_timeout`, every
/// statement on the session. Exceeding it is a failure, not a hang.
pub const OPERATION_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SchemaStatus {
    Created,
    AlreadyExisted,
}

impl Display for SchemaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyExisted => f.write_str("already existed"),
        }
    }
}

/// Owns the connection and every transaction boundary. One transaction per
/// logical operation; exactly one in-flight operation per connection.
pub struct StoreClient {
    client: Client,
    // insert statement prepared once per table, executed per record
    insert: Option<(String, Statement)>,
}

impl StoreClient {
    pub fn connect(conninfo: &str) -> Result<Self, ConnectionErr> {
        let mut config: Config =
            conninfo
                .parse()
                .map_err(|inner| ConnectionErr::ConfigErr {
                    conninfo: conninfo.to_string(),
                    inner,
                })?;
        config.connect_timeout(OPERATION_DEADLINE);
        let mut client = config.connect(NoTls)?;
        client.batch_execute(&format!(
            "SET statement_timeout = {}",
            OPERATION_DEADLINE.as_millis()
        ))?;
        Ok(Self {
            client,
            insert: None,
        })
    }

    /// Idempotently creates the target table, and the hypertable when the
    /// schema is partitioned. Never drops or alters existing schema. The
    /// status comes from an existence probe just before the guarded create,
    /// so a concurrent creator can make the report diverge from ground
    /// truth; acceptable for a benchmarking tool.
    pub fn ensure_schema(&mut self, schema: &Schema) -> Result<SchemaStatus, SchemaErr> {
        let table = schema.table().to_string();
        let existed = self.table_exists(&table)?;

        let mut transaction =
            self.client
                .transaction()
                .map_err(|inner| SchemaErr::TableCreationErr {
                    table: table.clone(),
                    inner,
                })?;
        transaction
            .batch_execute(&schema.create_table_sql())
            .map_err(|inner| SchemaErr::TableCreationErr {
                table: table.clone(),
                inner,
            })?;

        if existed {
            println!("Table '{}' already exists, creation skipped", table);
        } else {
            println!("Table '{}' created successfully", table);
        }

        if let Some(sql) = schema.create_hypertable_sql() {
            let row = transaction.query_one(sql.as_str(), &[]).map_err(|inner| {
                SchemaErr::HypertableCreationErr {
                    table: table.clone(),
                    inner,
                }
            })?;
            let created: bool =
                row.try_get("created")
                    .map_err(|inner| SchemaErr::HypertableCreationErr {
                        table: table.clone(),
                        inner,
                    })?;
            if created {
                println!("Hypertable '{}' created successfully", table);
            } else {
                println!("Hypertable '{}' already exists, creation skipped", table);
            }
        }

        transaction
            .commit()
            .map_err(|inner| SchemaErr::TableCreationErr {
                table: table.clone(),
                inner,
            })?;

        Ok(if existed {
            SchemaStatus::AlreadyExisted
        } else {
            SchemaStatus::Created
        })
    }

    fn table_exists(&mut self, table: &str) -> Result<bool, SchemaErr> {
        let to_schema_err = |inner| SchemaErr::ExistenceCheckErr {
            table: table.to_string(),
            inner,
        };
        let row = self
            .client
            .query_one("SELECT to_regclass($1) IS NOT NULL", &[&table])
            .map_err(to_schema_err)?;
        row.try_get(0).map_err(to_schema_err)
    }

    /// One parameterized insert in its own transaction. The transaction
    /// guard rolls back on every non-commit path.
    pub fn insert_one(&mut self, schema: &Schema, record: &Record) -> Result<(), StatementErr> {
        let statement = self.insert_statement(schema)?;
        let params = bind(schema, record)?;
        let mut transaction = self.client.transaction()?;
        transaction.execute(&statement, &params)?;
        transaction.commit()?;
        Ok(())
    }

    /// Repeated `insert_one`: one round trip and one transaction per record.
    /// A failing record is logged and skipped; returns the number inserted.
    pub fn insert_batch(&mut self, schema: &Schema, records: &[Record]) -> usize {
        let mut inserted = 0;
        for record in records {
            match self.insert_one(schema, record) {
                Ok(()) => inserted += 1,
                Err(err) => print_error(&err),
            }
        }
        inserted
    }

    pub fn query_all(&mut self, schema: &Schema) -> Result<Vec<Record>, StatementErr> {
        let mut transaction = self.client.transaction()?;
        let rows = transaction.query(schema.select_all_sql().as_str(), &[])?;
        transaction.commit()?;
        rows.iter().map(|row| row_to_record(schema, row)).collect()
    }

    pub fn query_latest(
        &mut self,
        schema: &Schema,
        limit: i64,
    ) -> Result<Vec<Record>, StatementErr> {
        let mut transaction = self.client.transaction()?;
        let rows = transaction.query(schema.select_latest_sql().as_str(), &[&limit])?;
        transaction.commit()?;
        rows.iter().map(|row| row_to_record(schema, row)).collect()
    }

    pub fn query_random(&mut self, schema: &Schema) -> Result<Option<Record>, StatementErr> {
        let mut transaction = self.client.transaction()?;
        let rows = transaction.query(schema.select_random_sql().as_str(), &[])?;
        transaction.commit()?;
        rows.first().map(|row| row_to_record(schema, row)).transpose()
    }

    /// Teardown for benches and live tests only; the pipeline never drops.
    pub fn drop_schema(&mut self, schema: &Schema) -> Result<(), StatementErr> {
        let stale = self
            .insert
            .as_ref()
            .is_some_and(|(table, _)| table == schema.table());
        if stale {
            self.insert = None;
        }
        Ok(self.client.batch_execute(&schema.drop_table_sql())?)
    }

    fn insert_statement(&mut self, schema: &Schema) -> Result<Statement, postgres::Error> {
        if let Some((table, statement)) = &self.insert {
            if table == schema.table() {
                return Ok(statement.clone());
            }
        }
        let statement = self.client.prepare(schema.insert_sql().as_str())?;
        self.insert = Some((schema.table().to_string(), statement.clone()));
        Ok(statement)
    }
}

/// Strict positional mapping from a result row back to a Record.
fn row_to_record(schema: &Schema, row: &Row) -> Result<Record, StatementErr> {
    let mut fields = Vec::with_capacity(schema.arity());
    for (idx, column) in schema.columns().iter().enumerate() {
        let to_column_err = |inner| StatementErr::ColumnReadErr {
            column: column.name.clone(),
            inner,
        };
        let value = match column.column_type {
            ColumnType::Timestamp => {
                FieldValue::Timestamp(row.try_get(idx).map_err(to_column_err)?)
            }
            ColumnType::FixedHex { .. } => {
                FieldValue::Hex(row.try_get(idx).map_err(to_column_err)?)
            }
            ColumnType::Text { .. } => FieldValue::Text(row.try_get(idx).map_err(to_column_err)?),
            ColumnType::BigInt => FieldValue::BigInt(row.try_get(idx).map_err(to_column_err)?),
        };
        fields.push(value);
    }
    Ok(Record::new(fields))
}
