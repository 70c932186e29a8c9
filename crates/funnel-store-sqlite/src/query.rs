//! Translation of [`RecordFilter`]s and [`RecordQuery`]s into SQL.
//!
//! Everything user-supplied travels as a bound parameter; only column names
//! and fixed keywords are spliced into the statement text.

use funnel_core::{
  filter::{RecordFilter, SearchField, SortOrder},
  range::{DateRange, UpperBound},
  store::{RecordQuery, RecordSortField},
};
use rusqlite::types::Value;

use crate::{
  encode::{RECORD_COLUMNS, encode_dt},
  schema::FOLD_CASE,
};

/// A `WHERE` clause (possibly empty) plus its positional parameters.
#[derive(Debug, Default)]
pub struct Clause {
  pub sql:    String,
  pub params: Vec<Value>,
}

fn search_column(field: SearchField) -> &'static str {
  match field {
    SearchField::CompanyName => "r.company_name",
    SearchField::CompanyCin => "r.company_cin",
    SearchField::DirectorFirstName => "r.director_first_name",
    SearchField::DirectorLastName => "r.director_last_name",
    SearchField::DirectorFullName => "(r.director_first_name || ' ' || r.director_last_name)",
    SearchField::DirectorEmail => "r.director_email",
    SearchField::DirectorDin => "r.director_din",
  }
}

fn range_condition(column: &str, range: DateRange, params: &mut Vec<Value>) -> String {
  params.push(Value::Text(encode_dt(range.start)));
  params.push(Value::Text(encode_dt(range.end)));
  let upper = match range.upper {
    UpperBound::Inclusive => "<=",
    UpperBound::Exclusive => "<",
  };
  format!("({column} >= ? AND {column} {upper} ?)")
}

/// Build the `WHERE` clause for `filter` over `campaign_records r`.
pub fn where_clause(filter: &RecordFilter) -> Clause {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  if !filter.any_of.is_empty() {
    // `instr`: `%` and `_` in a needle match literally. Needles arrive
    // folded with `to_lowercase`, so columns get the same Unicode folding.
    let ors: Vec<String> = filter
      .any_of
      .iter()
      .map(|clause| {
        params.push(Value::Text(clause.needle.clone()));
        format!("instr({FOLD_CASE}({}), ?) > 0", search_column(clause.field))
      })
      .collect();
    conds.push(format!("({})", ors.join(" OR ")));
  }

  if let Some(status) = filter.funnel_status {
    conds.push("r.funnel_status = ?".to_owned());
    params.push(Value::Text(status.as_ref().to_owned()));
  }

  if let Some(range) = filter.incorporated {
    conds.push(range_condition("r.date_of_incorporation", range, &mut params));
  }

  let sql = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  Clause { sql, params }
}

/// Full `SELECT` for a [`RecordQuery`], returning [`RECORD_COLUMNS`].
pub fn select_records(query: &RecordQuery) -> Clause {
  let Clause { sql: where_sql, mut params } = where_clause(&query.filter);

  let order = match query.sort {
    None => "r.seq".to_owned(),
    Some((field, order)) => {
      let column = match field {
        RecordSortField::CreatedAt => "r.created_at",
        RecordSortField::DateOfIncorporation => "r.date_of_incorporation",
      };
      let dir = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
      };
      format!("{column} {dir}, r.seq")
    }
  };

  // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
  params.push(Value::Integer(query.limit.map_or(-1, clamp)));
  params.push(Value::Integer(clamp(query.skip)));

  Clause {
    sql: format!(
      "SELECT {RECORD_COLUMNS} FROM campaign_records r {where_sql} ORDER BY {order} LIMIT ? OFFSET ?"
    ),
    params,
  }
}

/// `SELECT COUNT(*)` for `filter`.
pub fn count_records(filter: &RecordFilter) -> Clause {
  let Clause { sql: where_sql, params } = where_clause(filter);
  Clause {
    sql: format!("SELECT COUNT(*) FROM campaign_records r {where_sql}"),
    params,
  }
}

fn clamp(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

#[cfg(test)]
mod tests {
  use funnel_core::filter::{FilterBuilder, RawParams};

  use super::*;

  #[test]
  fn empty_filter_has_no_where() {
    let c = where_clause(&RecordFilter::default());
    assert!(c.sql.is_empty());
    assert!(c.params.is_empty());
  }

  #[test]
  fn search_clauses_are_or_ed_and_bound() {
    let filter = FilterBuilder::default()
      .search(&[SearchField::CompanyName, SearchField::DirectorEmail], Some("Ac%me"))
      .funnel_status(Some("active"))
      .build();
    let c = where_clause(&filter);
    assert_eq!(
      c.sql,
      "WHERE (instr(fold_case(r.company_name), ?) > 0 OR instr(fold_case(r.director_email), ?) > 0) \
       AND r.funnel_status = ?"
    );
    assert_eq!(
      c.params,
      vec![
        Value::Text("ac%me".into()),
        Value::Text("ac%me".into()),
        Value::Text("active".into()),
      ]
    );
  }

  #[test]
  fn incorporation_day_is_inclusive() {
    let p: RawParams = [("dateOfIncorporation", "2020-05-04")].into_iter().collect();
    let c = where_clause(&RecordFilter::from_params(&p));
    assert!(c.sql.contains("r.date_of_incorporation <= ?"));
    assert_eq!(c.params[1], Value::Text("2020-05-04T23:59:59.999Z".into()));
  }

  #[test]
  fn unsorted_query_keeps_insertion_order() {
    let c = select_records(&RecordQuery::all());
    assert!(c.sql.ends_with("ORDER BY r.seq LIMIT ? OFFSET ?"));
    assert_eq!(c.params, vec![Value::Integer(-1), Value::Integer(0)]);
  }
}
