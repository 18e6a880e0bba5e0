use postgres::types::ToSql;

use crate::error::StatementErr;
use crate::record::{FieldValue, Record};
use crate::schema::Schema;

/// Positional parameters for `schema.insert_sql()`, in column order. The
/// arity re-check is defensive; the decoder already guarantees it.
pub fn bind<'a>(
    schema: &Schema,
    record: &'a Record,
) -> Result<Vec<&'a (dyn ToSql + Sync)>, StatementErr> {
    if record.arity() != schema.arity() {
        return Err(StatementErr::SchemaMismatch {
            expected: schema.arity(),
            actual: record.arity(),
        });
    }
    Ok(record.fields().iter().map(as_sql).collect())
}

fn as_sql(field: &FieldValue) -> &(dyn ToSql + Sync) {
    match field {
        FieldValue::Timestamp(ts) => ts,
        FieldValue::Hex(s) | FieldValue::Text(s) => s,
        FieldValue::BigInt(n) => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn wallet_record() -> Record {
        Record::new(vec![
            FieldValue::parse("2020-10-02 00:00:00", ColumnType::Timestamp).unwrap(),
            FieldValue::Text("walletA".to_string()),
            FieldValue::Text("walletB".to_string()),
            FieldValue::BigInt(100000000),
        ])
    }

    #[test]
    fn test_bind_matches_arity() {
        let schema = Schema::bitcoin_transactions();
        let record = wallet_record();
        let params = bind(&schema, &record).unwrap();
        assert_eq!(params.len(), schema.arity());
    }

    #[test]
    fn test_bind_rejects_arity_mismatch() {
        let schema = Schema::block();
        let record = wallet_record();
        match bind(&schema, &record) {
            Err(StatementErr::SchemaMismatch { expected, actual }) => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 4);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }
}
