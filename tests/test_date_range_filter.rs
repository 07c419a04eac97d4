use chrono::{NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use daterange_filter::filter::{
    DateBounds, DateRangeError, DateRangeFilter, FilterState, RangePredicate, SQL_DATETIME_FORMAT,
    SqlQuery,
};

fn state(column: &str, value: Option<&str>) -> FilterState {
    FilterState::from([(column.to_string(), value.map(str::to_string))])
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn test_null_state_returns_query_unchanged() {
    let filter = DateRangeFilter::make("created_at");
    let original = SqlQuery::from_table("orders");

    let query = filter
        .date_range_query(original.clone(), &state("created_at", None))
        .expect("null state is not an error");

    assert_eq!(query, original);
    assert_eq!(query.to_sql(), r#"select * from "orders""#);
}

#[test]
fn test_iso_range_bounds_in_configured_timezone() {
    let filter = DateRangeFilter::make("created_at")
        .format("Y-m-d")
        .timezone("Europe/Paris");

    let query = filter
        .apply(Vec::<RangePredicate>::new(), Some("2024-01-01 - 2024-01-31"))
        .expect("valid range");

    assert_eq!(query.len(), 1);
    let predicate = &query[0];
    let paris: Tz = "Europe/Paris".parse().unwrap();
    assert_eq!(predicate.from, paris.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(predicate.to.date_naive(), date(2024, 1, 31));
    assert_eq!(
        (predicate.to.hour(), predicate.to.minute(), predicate.to.second()),
        (23, 59, 59)
    );
    assert_eq!(predicate.from.to_rfc3339(), "2024-01-01T00:00:00+01:00");
}

#[test]
fn test_malformed_states_add_no_constraint() {
    let filter = DateRangeFilter::make("created_at");

    for value in [
        "",
        "01/01/2024",
        "01/01/2024 31/01/2024",
        "01/01/2024 - 31/01/2024 x",
        "01/01/2024 - 15/01/2024 - 31/01/2024",
    ] {
        let query = filter
            .apply(SqlQuery::new(), Some(value))
            .expect("malformed state is a fallback, not an error");
        assert!(query.is_unconstrained(), "state {value:?} should not constrain");
    }
}

#[test]
fn test_unparseable_token_is_an_error() {
    let filter = DateRangeFilter::make("created_at");
    let err = filter
        .apply(SqlQuery::new(), Some("01/01/2024 - 2024-01-31"))
        .expect_err("wrong layout must not be silently dropped");

    match err {
        DateRangeError::InvalidDate { value, format, .. } => {
            assert_eq!(value, "2024-01-31");
            assert_eq!(format, "d/m/Y");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_timezone_is_an_error() {
    let filter = DateRangeFilter::make("created_at").timezone("Atlantis/Capital");
    assert!(matches!(
        filter.apply(SqlQuery::new(), Some("01/01/2024 - 02/01/2024")),
        Err(DateRangeError::UnknownTimezone(_))
    ));
}

#[test]
fn test_first_day_of_week_out_of_range_uses_default() {
    for day in [-1, 8, 100] {
        let filter = DateRangeFilter::make("created_at").first_day_of_week(day);
        assert_eq!(filter.config().first_day_of_week, 1, "day {day}");
    }
    for day in 0..=7 {
        let filter = DateRangeFilter::make("created_at").first_day_of_week(day);
        assert_eq!(i32::from(filter.config().first_day_of_week), day);
    }
}

#[test]
fn test_single_sided_default_covers_one_day() {
    let filter = DateRangeFilter::make("created_at").start_date(date(2024, 3, 10));

    let default = filter
        .default_state()
        .expect("default state")
        .expect("start date set");
    assert_eq!(default, "10/03/2024 - 10/03/2024");

    let bounds = filter
        .bounds(Some(&default))
        .expect("default state parses")
        .expect("three tokens");
    assert_eq!(bounds.from.date_naive(), date(2024, 3, 10));
    assert_eq!(bounds.to.date_naive(), date(2024, 3, 10));
    assert_eq!(bounds.from.time().hour(), 0);
    assert_eq!(bounds.to.time().hour(), 23);
}

#[test]
fn test_format_and_reparse_round_trip() {
    for (format, tz) in [
        ("d/m/Y", "UTC"),
        ("Y-m-d", "America/New_York"),
        ("j.n.y", "Asia/Tokyo"),
        (r"Y-m-d\TH:i", "Europe/Paris"),
        ("d/m/Y@H:i:s", "America/Sao_Paulo"),
    ] {
        let filter = DateRangeFilter::make("created_at").format(format).timezone(tz);
        let zone = filter.resolved_timezone().unwrap();
        let bounds = DateBounds::for_dates(date(2023, 12, 31), date(2024, 2, 29), zone).unwrap();

        let state = bounds.to_state(&filter.date_format().unwrap());
        let reparsed = filter.bounds(Some(&state)).unwrap().expect("round trip state");
        assert_eq!(reparsed, bounds, "format {format} in {tz}");
    }
}

#[test]
fn test_time_bearing_format_with_space_is_rejected() {
    let filter = DateRangeFilter::make("created_at").format("Y-m-d H:i");

    assert!(matches!(
        filter.bounds(Some("2024-01-01 00:00 - 2024-01-01 23:59")),
        Err(DateRangeError::SpaceInFormat { .. })
    ));
    assert!(matches!(
        filter.start_date(date(2024, 1, 1)).default_state(),
        Err(DateRangeError::SpaceInFormat { .. })
    ));
}

#[test]
fn test_time_bearing_default_state_resolves() {
    let filter = DateRangeFilter::make("created_at")
        .format(r"Y-m-d\TH:i")
        .start_date(date(2024, 1, 1));

    let default = filter.default_state().unwrap().expect("start date set");
    assert_eq!(default, "2024-01-01T00:00 - 2024-01-01T00:00");
    let bounds = filter.bounds(Some(&default)).unwrap().expect("three tokens");
    assert_eq!(bounds.to.date_naive(), date(2024, 1, 1));
    assert_eq!(bounds.to.hour(), 23);
}

#[test]
fn test_use_column_targets_other_state_key() {
    let filter = DateRangeFilter::make("period").use_column("orders.created_at");
    let query = filter
        .date_range_query(
            SqlQuery::new(),
            &state("orders.created_at", Some("01/01/2024 - 31/01/2024")),
        )
        .unwrap();

    assert_eq!(
        query.to_sql(),
        r#"select * where "orders"."created_at" between ? and ?"#
    );
    assert_eq!(query.bindings(), ["2024-01-01 00:00:00", "2024-01-31 23:59:59"]);
}

#[test]
fn test_default_today_uses_timezone_date() {
    let filter = DateRangeFilter::make("created_at")
        .format("Y-m-d")
        .timezone("Pacific/Kiritimati")
        .default_today();

    let default = filter.default_state().unwrap().expect("today set");
    let today = chrono::Utc::now()
        .with_timezone(&chrono_tz::Pacific::Kiritimati)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(default, format!("{today} - {today}"));
}

#[test]
fn test_predicate_filters_records_in_memory() {
    let filter = DateRangeFilter::make("created_at").timezone("Asia/Tokyo");
    let predicates = filter
        .apply(Vec::<RangePredicate>::new(), Some("01/01/2024 - 01/01/2024"))
        .unwrap();
    let predicate = &predicates[0];

    // 2023-12-31T15:00Z is midnight in Tokyo
    let inside = chrono::Utc.with_ymd_and_hms(2023, 12, 31, 15, 0, 0).unwrap();
    let before = chrono::Utc.with_ymd_and_hms(2023, 12, 31, 14, 59, 59).unwrap();
    assert!(predicate.contains(&inside));
    assert!(!predicate.contains(&before));
}

#[test]
fn test_sql_bindings_agree_with_in_memory_matching() {
    let filter = DateRangeFilter::make("created_at").timezone("Asia/Tokyo");
    let state = Some("01/01/2024 - 01/01/2024");
    let tokyo = chrono_tz::Asia::Tokyo;

    // column stores UTC instants
    let utc_query = filter.apply(SqlQuery::new().stored_in(Tz::UTC), state).unwrap();
    assert_eq!(utc_query.bindings(), ["2023-12-31 15:00:00", "2024-01-01 14:59:59"]);
    // column stores Tokyo wall-clock times
    let local_query = filter.apply(SqlQuery::new(), state).unwrap();
    assert_eq!(local_query.bindings(), ["2024-01-01 00:00:00", "2024-01-01 23:59:59"]);

    let predicate = &utc_query.predicates()[0];
    let between = |bindings: &[String], value: String| bindings[0] <= value && value <= bindings[1];

    for record in [
        chrono::Utc.with_ymd_and_hms(2023, 12, 31, 14, 59, 59).unwrap(),
        chrono::Utc.with_ymd_and_hms(2023, 12, 31, 15, 0, 0).unwrap(),
        chrono::Utc.with_ymd_and_hms(2024, 1, 1, 14, 59, 59).unwrap(),
        chrono::Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap(),
    ] {
        let stored_utc = record.naive_utc().format(SQL_DATETIME_FORMAT).to_string();
        let local = record.with_timezone(&tokyo).naive_local();
        let stored_local = local.format(SQL_DATETIME_FORMAT).to_string();

        let expected = predicate.contains(&record);
        assert_eq!(between(utc_query.bindings(), stored_utc), expected, "{record}");
        assert_eq!(between(local_query.bindings(), stored_local), expected, "{record}");
        assert_eq!(predicate.contains_local(&local), expected, "{record}");
    }
}
