//! Date-range resolver: precedence table, overflow amounts and properties
//! over generated calendars.
#![allow(clippy::unwrap_used)]

use chrono::{Days, NaiveDate};
use perf_engine::dates::parse_date;
use perf_engine::{DateIndex, DateRangeQuery, PerfError, RangeSide, resolve_range};
use proptest::prelude::*;
use proptest::sample::Index;
use test_case::test_case;

/// Two trading weeks, Mon 2021-01-04 .. Fri 2021-01-15.
fn calendar() -> DateIndex {
    DateIndex::parse(&[
        "2021-01-04",
        "2021-01-05",
        "2021-01-06",
        "2021-01-07",
        "2021-01-08",
        "2021-01-11",
        "2021-01-12",
        "2021-01-13",
        "2021-01-14",
        "2021-01-15",
    ])
    .unwrap()
}

#[test_case(None, None, None, (0, 9) ; "no limits covers the index")]
#[test_case(None, None, Some(3), (0, 9) ; "offset alone is ignored")]
#[test_case(Some("2021-01-05"), Some("2021-01-13"), None, (1, 7) ; "start and end on index dates")]
#[test_case(Some("2021-01-09"), Some("2021-01-13"), None, (5, 7) ; "weekend start limit snaps forward")]
#[test_case(Some("2021-01-05"), Some("2021-01-13"), Some(1), (1, 7) ; "offset ignored when both limits set")]
#[test_case(Some("2021-01-06"), None, Some(3), (2, 5) ; "start plus offset")]
#[test_case(Some("2021-01-09"), None, Some(0), (5, 5) ; "weekend start snaps to next monday")]
#[test_case(Some("2021-01-11"), None, None, (5, 9) ; "start only runs to last date")]
#[test_case(None, Some("2021-01-13"), Some(2), (5, 7) ; "end minus offset")]
#[test_case(None, Some("2021-01-10"), Some(4), (0, 4) ; "weekend end snaps to previous friday")]
#[test_case(None, Some("2021-01-07"), None, (0, 3) ; "end only starts at first date")]
fn resolves(start: Option<&str>, end: Option<&str>, offset: Option<i64>, expected: (usize, usize)) {
    let query = DateRangeQuery::parse(start, end, offset).unwrap();
    let result = resolve_range(&calendar(), &query);
    let Ok(range) = result else {
        panic!("query should resolve: {result:?}");
    };
    assert_eq!((range.iloc_start, range.iloc_end), expected);
    let index = calendar();
    assert_eq!(Some(range.date_start), index.get(expected.0));
    assert_eq!(Some(range.date_end), index.get(expected.1));
    assert_eq!(range.row_count(), expected.1 - expected.0 + 1);
}

#[test_case(Some("2021-01-08"), None, Some(6), RangeSide::End, 1 ; "start offset past last date")]
#[test_case(None, Some("2021-01-06"), Some(5), RangeSide::Start, 3 ; "end offset before first date")]
#[test_case(Some("2020-12-31"), None, None, RangeSide::Start, 4 ; "start limit before index")]
#[test_case(None, Some("2021-01-20"), None, RangeSide::End, 5 ; "end limit after index")]
fn overflows(start: Option<&str>, end: Option<&str>, offset: Option<i64>, side: RangeSide, by: usize) {
    let query = DateRangeQuery::parse(start, end, offset).unwrap();
    let Err(PerfError::Range {
        side: got_side,
        overflow,
        ..
    }) = resolve_range(&calendar(), &query)
    else {
        panic!("query should overflow the index");
    };
    assert_eq!(got_side, side);
    assert_eq!(overflow, by);
}

#[test]
fn weekend_only_span_has_no_rows() {
    let query = DateRangeQuery::parse(Some("2021-01-09"), Some("2021-01-10"), None).unwrap();
    assert!(matches!(
        resolve_range(&calendar(), &query),
        Err(PerfError::Range {
            side: RangeSide::End,
            overflow: 1,
            ..
        })
    ));
}

#[test]
fn rejects_bad_limits_before_resolving() {
    assert!(matches!(
        DateRangeQuery::parse(Some("2021-01-08"), Some("2021-01-08"), None),
        Err(PerfError::InvalidRange { .. })
    ));
    assert!(matches!(
        DateRangeQuery::parse(Some("2021-01-08"), Some("2021-01-05"), None),
        Err(PerfError::InvalidRange { .. })
    ));
    assert!(matches!(
        DateRangeQuery::parse(Some("08/01/2021"), None, None),
        Err(PerfError::Value { .. })
    ));
    assert!(matches!(
        DateRangeQuery::parse(None, Some("2021-01-08"), Some(-1)),
        Err(PerfError::Value { .. })
    ));
}

#[test]
fn resolved_dates_are_always_index_entries() {
    let index = calendar();
    let first = parse_date("2021-01-01").unwrap();
    for day in 3..=16 {
        let pivot = first + Days::new(day);
        let query = DateRangeQuery::new(Some(pivot), None, None).unwrap();
        if let Ok(range) = resolve_range(&index, &query) {
            assert!(index.contains(range.date_start));
            assert!(index.contains(range.date_end));
            assert!(range.date_start >= pivot);
        }
    }
}

/// Calendars of 1..60 dates with gaps of 1..5 days.
fn calendars() -> impl Strategy<Value = DateIndex> {
    prop::collection::vec(1u64..5, 1..60).prop_map(|gaps| {
        let mut day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = gaps
            .into_iter()
            .map(|gap| {
                day = day + Days::new(gap);
                day
            })
            .collect();
        DateIndex::new(dates).unwrap()
    })
}

proptest! {
    #[test]
    fn no_limits_cover_any_index(index in calendars(), offset in prop::option::of(0i64..100)) {
        let query = DateRangeQuery::new(None, None, offset).unwrap();
        let range = resolve_range(&index, &query).unwrap();
        prop_assert_eq!(range.date_start, index.first());
        prop_assert_eq!(range.date_end, index.last());
        prop_assert_eq!((range.iloc_start, range.iloc_end), (0, index.last_iloc()));
    }

    #[test]
    fn start_plus_offset_or_end_overflow(
        index in calendars(),
        pick in any::<Index>(),
        offset in 0usize..80,
    ) {
        let pos = pick.index(index.len());
        let start = index.get(pos).unwrap();
        let query = DateRangeQuery::new(Some(start), None, Some(offset as i64)).unwrap();
        match resolve_range(&index, &query) {
            Ok(range) => {
                prop_assert_eq!(range.iloc_start, pos);
                prop_assert_eq!(range.iloc_end, range.iloc_start + offset);
                prop_assert_eq!(Some(range.date_end), index.get(range.iloc_end));
            }
            Err(PerfError::Range { side, overflow, .. }) => {
                prop_assert_eq!(side, RangeSide::End);
                prop_assert!(pos + offset > index.last_iloc());
                prop_assert_eq!(overflow, pos + offset - index.last_iloc());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn end_minus_offset_or_start_overflow(
        index in calendars(),
        pick in any::<Index>(),
        offset in 0usize..80,
    ) {
        let pos = pick.index(index.len());
        let end = index.get(pos).unwrap();
        let query = DateRangeQuery::new(None, Some(end), Some(offset as i64)).unwrap();
        match resolve_range(&index, &query) {
            Ok(range) => {
                prop_assert_eq!(range.iloc_end, pos);
                prop_assert_eq!(range.iloc_start + offset, range.iloc_end);
            }
            Err(PerfError::Range { side, overflow, .. }) => {
                prop_assert_eq!(side, RangeSide::Start);
                prop_assert!(offset > pos);
                prop_assert_eq!(overflow, offset - pos);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn single_date_index() {
    let index = DateIndex::parse(&["2021-01-04"]).unwrap();

    let range = resolve_range(&index, &DateRangeQuery::full()).unwrap();
    assert_eq!((range.iloc_start, range.iloc_end), (0, 0));
    assert_eq!(range.row_count(), 1);

    let query = DateRangeQuery::parse(Some("2021-01-04"), None, Some(0)).unwrap();
    assert_eq!(resolve_range(&index, &query).unwrap().row_count(), 1);

    let query = DateRangeQuery::parse(Some("2021-01-04"), None, Some(1)).unwrap();
    assert!(matches!(
        resolve_range(&index, &query),
        Err(PerfError::Range {
            side: RangeSide::End,
            overflow: 1,
            ..
        })
    ));
}
