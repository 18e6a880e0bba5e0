use std::fmt::{self, Display};

use chrono::NaiveDateTime;

use crate::schema::ColumnType;
use crate::TIMESTAMP_FORMAT;

/// One decoded field. Numeric and temporal fields hold native values, never
/// formatted strings.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Timestamp(NaiveDateTime),
    Hex(String),
    Text(String),
    BigInt(i64),
}

impl FieldValue {
    /// Parses one CSV token against its column type. `None` means the token
    /// does not satisfy the type (wrong width, not hex, unparseable).
    pub fn parse(token: &str, column_type: ColumnType) -> Option<Self> {
        match column_type {
            ColumnType::Timestamp => NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT)
                .ok()
                .map(Self::Timestamp),
            ColumnType::FixedHex { width } => {
                if token.len() == width && token.bytes().all(|b| b.is_ascii_hexdigit()) {
                    Some(Self::Hex(token.to_string()))
                } else {
                    None
                }
            }
            ColumnType::Text { width } => {
                if token.len() <= width {
                    Some(Self::Text(token.to_string()))
                } else {
                    None
                }
            }
            ColumnType::BigInt => token.parse::<i64>().ok().map(Self::BigInt),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Self::Hex(s) | Self::Text(s) => f.write_str(s),
            Self::BigInt(n) => write!(f, "{}", n),
        }
    }
}

/// An immutable row: built once from an input line, consumed by exactly one
/// insert, then discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    fields: Vec<FieldValue>,
}

impl Record {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn to_csv_line(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let parsed = FieldValue::parse("2020-10-02 00:00:00", ColumnType::Timestamp).unwrap();
        assert_eq!(parsed.to_string(), "2020-10-02 00:00:00");
        assert!(FieldValue::parse("yesterday", ColumnType::Timestamp).is_none());
        assert!(FieldValue::parse("2020-10-02", ColumnType::Timestamp).is_none());
    }

    #[test]
    fn test_parse_fixed_hex_enforces_width() {
        let hex = "0123456789abcdef0123456789abcdef";
        let parsed = FieldValue::parse(hex, ColumnType::FixedHex { width: 32 }).unwrap();
        assert_eq!(parsed, FieldValue::Hex(hex.to_string()));

        assert!(FieldValue::parse("abc", ColumnType::FixedHex { width: 32 }).is_none());
        let not_hex = "z123456789abcdef0123456789abcdef";
        assert!(FieldValue::parse(not_hex, ColumnType::FixedHex { width: 32 }).is_none());
    }

    #[test]
    fn test_parse_text_enforces_width() {
        assert_eq!(
            FieldValue::parse("walletA", ColumnType::Text { width: 63 }),
            Some(FieldValue::Text("walletA".to_string()))
        );
        assert!(FieldValue::parse(&"x".repeat(64), ColumnType::Text { width: 63 }).is_none());
    }

    #[test]
    fn test_parse_bigint_is_native() {
        assert_eq!(
            FieldValue::parse("100000000", ColumnType::BigInt),
            Some(FieldValue::BigInt(100000000))
        );
        assert_eq!(
            FieldValue::parse("-42", ColumnType::BigInt),
            Some(FieldValue::BigInt(-42))
        );
        assert!(FieldValue::parse("1e8", ColumnType::BigInt).is_none());
        assert!(FieldValue::parse("", ColumnType::BigInt).is_none());
    }

    #[test]
    fn test_to_csv_line() {
        let record = Record::new(vec![
            FieldValue::parse("2020-10-02 00:00:00", ColumnType::Timestamp).unwrap(),
            FieldValue::Text("walletA".to_string()),
            FieldValue::Text("walletB".to_string()),
            FieldValue::BigInt(100000000),
        ]);
        assert_eq!(record.arity(), 4);
        assert_eq!(
            record.to_csv_line(),
            "2020-10-02 00:00:00,walletA,walletB,100000000"
        );
    }
}
