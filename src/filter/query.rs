use super::parser::DateBounds;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// Format used for bound values handed to a database
pub const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `column BETWEEN from AND to`, both ends inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangePredicate {
    pub column: String,
    pub from: DateTime<Tz>,
    pub to: DateTime<Tz>,
}

impl RangePredicate {
    pub fn new(column: impl Into<String>, bounds: DateBounds) -> Self {
        Self {
            column: column.into(),
            from: bounds.from,
            to: bounds.to,
        }
    }

    /// Check an absolute instant against the predicate without a database.
    ///
    /// Agrees with a column compared against [`bindings_in`](Self::bindings_in)
    /// for the timezone the column is stored in.
    pub fn contains<Z: TimeZone>(&self, value: &DateTime<Z>) -> bool {
        let value = value.with_timezone(&self.from.timezone());
        self.from <= value && value <= self.to
    }

    /// Check a wall-clock value in the filter's timezone, the convention used
    /// by [`bindings`](Self::bindings). Both ends are compared at second precision.
    pub fn contains_local(&self, value: &NaiveDateTime) -> bool {
        let value = value.format(SQL_DATETIME_FORMAT).to_string();
        let [from, to] = self.bindings();
        from <= value && value <= to
    }

    /// Bound values as wall-clock time in the filter's timezone, offset dropped.
    ///
    /// Suits columns that hold local times of that zone.
    pub fn bindings(&self) -> [String; 2] {
        [
            self.from.format(SQL_DATETIME_FORMAT).to_string(),
            self.to.format(SQL_DATETIME_FORMAT).to_string(),
        ]
    }

    /// Bound values converted to the timezone a column is stored in
    pub fn bindings_in<Z>(&self, tz: &Z) -> [String; 2]
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        [
            self.from.with_timezone(tz).format(SQL_DATETIME_FORMAT).to_string(),
            self.to.with_timezone(tz).format(SQL_DATETIME_FORMAT).to_string(),
        ]
    }
}

impl fmt::Display for RangePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [from, to] = self.bindings();
        write!(
            f,
            "{} BETWEEN '{}' AND '{}'",
            quote_identifier(&self.column),
            from,
            to
        )
    }
}

/// The seam between the filter and whatever builds the real query.
///
/// The filter hands over an owned query and gets it back, with or without a
/// range constraint added.
pub trait QueryBuilder: Sized {
    fn where_between(self, predicate: RangePredicate) -> Self;
}

/// Collected predicates are a query in their own right; useful for callers
/// that evaluate them in memory.
impl QueryBuilder for Vec<RangePredicate> {
    fn where_between(mut self, predicate: RangePredicate) -> Self {
        self.push(predicate);
        self
    }
}

/// A minimal `SELECT` with positional placeholders and string bindings.
///
/// Bindings are wall-clock times in the filter's timezone unless the query is
/// told which timezone its columns are stored in with [`stored_in`](Self::stored_in).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlQuery {
    table: Option<String>,
    conditions: Vec<String>,
    bindings: Vec<String>,
    #[serde(skip)]
    storage_timezone: Option<Tz>,
    #[serde(skip)]
    predicates: Vec<RangePredicate>,
}

impl SqlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Bind bounds converted to `tz`, e.g. UTC for `timestamptz` columns
    pub fn stored_in(mut self, tz: Tz) -> Self {
        self.storage_timezone = Some(tz);
        self
    }

    pub fn storage_timezone(&self) -> Option<Tz> {
        self.storage_timezone
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    pub fn predicates(&self) -> &[RangePredicate] {
        &self.predicates
    }

    pub fn is_unconstrained(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render the statement; the WHERE clause is omitted when empty
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("select *");
        if let Some(table) = &self.table {
            sql.push_str(" from ");
            sql.push_str(&quote_identifier(table));
        }
        if !self.conditions.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&self.conditions.join(" and "));
        }
        sql
    }
}

impl QueryBuilder for SqlQuery {
    fn where_between(mut self, predicate: RangePredicate) -> Self {
        self.conditions
            .push(format!("{} between ? and ?", quote_identifier(&predicate.column)));
        let bindings = match &self.storage_timezone {
            Some(tz) => predicate.bindings_in(tz),
            None => predicate.bindings(),
        };
        self.bindings.extend(bindings);
        self.predicates.push(predicate);
        self
    }
}

/// Double-quote an identifier, quoting each dotted segment separately
pub fn quote_identifier(identifier: &str) -> String {
    identifier
        .split('.')
        .map(|segment| format!("\"{}\"", segment.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn january() -> DateBounds {
        DateBounds::for_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            Tz::UTC,
        )
        .unwrap()
    }

    #[test]
    fn test_predicate_bindings_and_display() {
        let predicate = RangePredicate::new("created_at", january());
        assert_eq!(
            predicate.bindings(),
            ["2024-01-01 00:00:00".to_string(), "2024-01-31 23:59:59".to_string()]
        );
        assert_eq!(
            predicate.to_string(),
            r#""created_at" BETWEEN '2024-01-01 00:00:00' AND '2024-01-31 23:59:59'"#
        );
    }

    #[test]
    fn test_contains_is_inclusive() {
        let predicate = RangePredicate::new("created_at", january());
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert!(predicate.contains(&first));
        assert!(predicate.contains(&last));
        assert!(!predicate.contains(&after));
    }

    #[test]
    fn test_sql_query_rendering() {
        let query = SqlQuery::from_table("public.orders")
            .where_between(RangePredicate::new("created_at", january()));

        assert_eq!(
            query.to_sql(),
            r#"select * from "public"."orders" where "created_at" between ? and ?"#
        );
        assert_eq!(query.bindings().len(), 2);
        assert_eq!(query.predicates().len(), 1);
        assert!(!query.is_unconstrained());
        assert_eq!(SqlQuery::new().to_sql(), "select *");
    }

    #[test]
    fn test_bindings_in_storage_timezone() {
        let predicate = RangePredicate::new("created_at", january());
        let paris: Tz = "Europe/Paris".parse().unwrap();
        assert_eq!(
            predicate.bindings_in(&paris),
            ["2024-01-01 01:00:00".to_string(), "2024-02-01 00:59:59".to_string()]
        );
        assert_eq!(predicate.bindings_in(&Utc), predicate.bindings());
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier(r#"we"ird"#), r#""we""ird""#);
    }
}
