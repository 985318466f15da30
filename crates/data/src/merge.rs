//! Merge engine: joins spend and conversion series into daily stats.
//!
//! Both inputs are indexed by (date, campaign_id). The output covers the full
//! outer union of keys whose date lies inside the requested range, with the
//! missing side defaulted to zero. Duplicate keys within one input resolve
//! last-write-wins.
//!
//! CPA is `spend / conversions` rounded to two decimal places, half away from
//! zero, computed in exact decimal arithmetic. It is only defined when both
//! spend and conversions are positive.

use chrono::NaiveDate;
use cpa_sync_core::ParseError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeSet, HashMap};

use crate::models::{
    ConversionRecord, DateRange, MergedStat, RawConversionRecord, RawSpendRecord, SpendRecord,
};

pub use crate::models::parse_date;

/// Fractional digits kept on CPA.
pub const CPA_DECIMAL_PLACES: u32 = 2;

/// Computes cost per acquisition.
///
/// Returns `None` unless `spend > 0` and `conversions > 0`, so zero spend or
/// zero conversions never yield a zero or a division error.
#[must_use]
pub fn compute_cpa(spend: Decimal, conversions: i32) -> Option<Decimal> {
    if spend <= Decimal::ZERO || conversions <= 0 {
        return None;
    }

    spend
        .checked_div(Decimal::from(conversions))
        .map(|cpa| cpa.round_dp_with_strategy(CPA_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
}

/// Merges typed spend and conversion records over `range`.
///
/// Output is ordered by (date, campaign_id).
#[must_use]
pub fn merge_stats(
    spend: &[SpendRecord],
    conversions: &[ConversionRecord],
    range: &DateRange,
) -> Vec<MergedStat> {
    // Later entries overwrite earlier ones on collect
    let spend_index: HashMap<(NaiveDate, &str), Decimal> = spend
        .iter()
        .map(|r| ((r.date, r.campaign_id.as_str()), r.spend))
        .collect();
    let conversion_index: HashMap<(NaiveDate, &str), i32> = conversions
        .iter()
        .map(|r| ((r.date, r.campaign_id.as_str()), r.conversions))
        .collect();

    let keys: BTreeSet<(NaiveDate, &str)> = spend_index
        .keys()
        .chain(conversion_index.keys())
        .copied()
        .filter(|(date, _)| range.contains(*date))
        .collect();

    keys.into_iter()
        .map(|key| {
            let spend = spend_index.get(&key).copied().unwrap_or(Decimal::ZERO);
            let conversions = conversion_index.get(&key).copied().unwrap_or(0);
            MergedStat::new(key.0, key.1, spend, conversions)
        })
        .collect()
}

/// Parses raw records and merges them over `range`.
///
/// Parsing is fail-fast: the first malformed date aborts the whole call,
/// including records that would have fallen outside the range.
///
/// # Errors
/// Returns [`ParseError`] if any record carries a malformed date.
pub fn merge_raw_stats(
    spend: &[RawSpendRecord],
    conversions: &[RawConversionRecord],
    range: &DateRange,
) -> Result<Vec<MergedStat>, ParseError> {
    let (spend, conversions) = parse_records(spend, conversions)?;
    Ok(merge_stats(&spend, &conversions, range))
}

/// Converts both raw series into typed records.
///
/// # Errors
/// Returns [`ParseError`] on the first malformed date.
pub fn parse_records(
    spend: &[RawSpendRecord],
    conversions: &[RawConversionRecord],
) -> Result<(Vec<SpendRecord>, Vec<ConversionRecord>), ParseError> {
    let spend = spend
        .iter()
        .map(SpendRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let conversions = conversions
        .iter()
        .map(ConversionRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((spend, conversions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn raw_spend(d: &str, campaign: &str, spend: Decimal) -> RawSpendRecord {
        RawSpendRecord {
            date: d.to_string(),
            campaign_id: campaign.to_string(),
            spend,
        }
    }

    fn raw_conv(d: &str, campaign: &str, conversions: i32) -> RawConversionRecord {
        RawConversionRecord {
            date: d.to_string(),
            campaign_id: campaign.to_string(),
            conversions,
        }
    }

    fn find<'a>(rows: &'a [MergedStat], d: &str, campaign: &str) -> &'a MergedStat {
        rows.iter()
            .find(|r| r.date == date(d) && r.campaign_id == campaign)
            .unwrap_or_else(|| panic!("missing row {d} {campaign}"))
    }

    #[test]
    fn test_cpa_rounding() {
        assert_eq!(compute_cpa(dec!(19.90), 3), Some(dec!(6.63)));
        assert_eq!(compute_cpa(dec!(37.50), 14), Some(dec!(2.68)));
        assert_eq!(compute_cpa(dec!(42.10), 10), Some(dec!(4.21)));
    }

    #[test]
    fn test_cpa_midpoints_round_away_from_zero() {
        // 0.005 and 0.025 sit exactly on the midpoint
        assert_eq!(compute_cpa(dec!(0.01), 2), Some(dec!(0.01)));
        assert_eq!(compute_cpa(dec!(0.05), 2), Some(dec!(0.03)));
        assert_eq!(compute_cpa(dec!(0.03), 2), Some(dec!(0.02)));
        // just below the midpoint rounds down
        assert_eq!(compute_cpa(dec!(0.0249), 1), Some(dec!(0.02)));
        assert_eq!(compute_cpa(dec!(1.0049), 1), Some(dec!(1.00)));
    }

    #[test]
    fn test_cpa_undefined_without_positive_inputs() {
        assert_eq!(compute_cpa(Decimal::ZERO, 5), None);
        assert_eq!(compute_cpa(dec!(10), 0), None);
        assert_eq!(compute_cpa(Decimal::ZERO, 0), None);
        assert_eq!(compute_cpa(dec!(-10), 5), None);
        assert_eq!(compute_cpa(dec!(10), -5), None);
    }

    #[test]
    fn test_single_matching_key() {
        let rows = merge_raw_stats(
            &[raw_spend("2025-06-04", "CAMP-123", dec!(37.50))],
            &[raw_conv("2025-06-04", "CAMP-123", 14)],
            &range("2025-06-04", "2025-06-04"),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, dec!(37.50));
        assert_eq!(rows[0].conversions, 14);
        assert_eq!(rows[0].cpa, Some(dec!(2.68)));
    }

    #[test]
    fn test_spend_only_key_defaults_conversions() {
        let rows = merge_raw_stats(
            &[raw_spend("2025-06-06", "CAMP-999", dec!(5.25))],
            &[],
            &range("2025-06-06", "2025-06-06"),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].conversions, 0);
        assert_eq!(rows[0].cpa, None);
    }

    #[test]
    fn test_conversion_only_key_defaults_spend() {
        let rows = merge_raw_stats(
            &[],
            &[raw_conv("2025-06-06", "CAMP-888", 7)],
            &range("2025-06-06", "2025-06-06"),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, Decimal::ZERO);
        assert_eq!(rows[0].cpa, None);
    }

    #[test]
    fn test_reference_data_set() {
        let spend = vec![
            raw_spend("2025-06-04", "CAMP-123", dec!(37.50)),
            raw_spend("2025-06-04", "CAMP-456", dec!(19.90)),
            raw_spend("2025-06-05", "CAMP-123", dec!(42.10)),
            raw_spend("2025-06-05", "CAMP-789", dec!(11.00)),
            raw_spend("2025-06-06", "CAMP-999", dec!(5.25)),
        ];
        let conversions = vec![
            raw_conv("2025-06-04", "CAMP-123", 14),
            raw_conv("2025-06-04", "CAMP-456", 3),
            raw_conv("2025-06-05", "CAMP-123", 10),
            raw_conv("2025-06-05", "CAMP-456", 5),
            raw_conv("2025-06-06", "CAMP-888", 7),
        ];

        let rows =
            merge_raw_stats(&spend, &conversions, &range("2025-06-04", "2025-06-06")).unwrap();

        assert_eq!(rows.len(), 7);
        assert_eq!(find(&rows, "2025-06-04", "CAMP-123").cpa, Some(dec!(2.68)));
        assert_eq!(find(&rows, "2025-06-04", "CAMP-456").cpa, Some(dec!(6.63)));
        assert_eq!(find(&rows, "2025-06-05", "CAMP-123").cpa, Some(dec!(4.21)));
        assert_eq!(find(&rows, "2025-06-05", "CAMP-789").cpa, None);
        assert_eq!(find(&rows, "2025-06-06", "CAMP-888").cpa, None);

        let camp_456 = find(&rows, "2025-06-05", "CAMP-456");
        assert_eq!(camp_456.spend, Decimal::ZERO);
        assert_eq!(camp_456.conversions, 5);
    }

    #[test]
    fn test_disjoint_keys_give_union() {
        let spend = vec![
            SpendRecord::new(date("2025-06-01"), "A", dec!(10)),
            SpendRecord::new(date("2025-06-02"), "B", dec!(20)),
        ];
        let conversions = vec![
            ConversionRecord::new(date("2025-06-01"), "C", 1),
            ConversionRecord::new(date("2025-06-03"), "A", 2),
        ];

        let rows = merge_stats(&spend, &conversions, &range("2025-06-01", "2025-06-03"));

        let keys: Vec<(NaiveDate, &str)> = rows.iter().map(MergedStat::key).collect();
        assert_eq!(
            keys,
            vec![
                (date("2025-06-01"), "A"),
                (date("2025-06-01"), "C"),
                (date("2025-06-02"), "B"),
                (date("2025-06-03"), "A"),
            ]
        );
        assert!(rows.iter().all(|r| r.cpa.is_none()));
    }

    #[test]
    fn test_out_of_range_keys_are_dropped() {
        let spend = vec![
            SpendRecord::new(date("2025-06-03"), "CAMP-1", dec!(10)),
            SpendRecord::new(date("2025-06-04"), "CAMP-1", dec!(20)),
            SpendRecord::new(date("2025-06-07"), "CAMP-1", dec!(30)),
        ];
        let conversions = vec![ConversionRecord::new(date("2025-06-07"), "CAMP-1", 3)];

        let rows = merge_stats(&spend, &conversions, &range("2025-06-04", "2025-06-06"));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date("2025-06-04"));
        assert_eq!(rows[0].spend, dec!(20));
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let spend = vec![
            SpendRecord::new(date("2025-06-04"), "CAMP-1", dec!(10)),
            SpendRecord::new(date("2025-06-04"), "CAMP-1", dec!(30)),
        ];
        let conversions = vec![
            ConversionRecord::new(date("2025-06-04"), "CAMP-1", 2),
            ConversionRecord::new(date("2025-06-04"), "CAMP-1", 4),
        ];

        let rows = merge_stats(&spend, &conversions, &DateRange::single(date("2025-06-04")));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, dec!(30));
        assert_eq!(rows[0].conversions, 4);
        assert_eq!(rows[0].cpa, Some(dec!(7.50)));
    }

    #[test]
    fn test_negative_values_pass_through() {
        let spend = vec![SpendRecord::new(date("2025-06-04"), "CAMP-1", dec!(-5))];
        let conversions = vec![ConversionRecord::new(date("2025-06-04"), "CAMP-1", 2)];

        let rows = merge_stats(&spend, &conversions, &DateRange::single(date("2025-06-04")));

        assert_eq!(rows[0].spend, dec!(-5));
        assert_eq!(rows[0].cpa, None);
    }

    #[test]
    fn test_empty_inputs_give_empty_output() {
        let rows = merge_stats(&[], &[], &range("2025-06-01", "2025-06-30"));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_date_aborts_merge() {
        let spend = vec![
            raw_spend("2025-06-04", "CAMP-1", dec!(10)),
            raw_spend("not-a-date", "CAMP-2", dec!(10)),
        ];

        let err = merge_raw_stats(&spend, &[], &range("2025-06-04", "2025-06-04")).unwrap_err();
        let ParseError::InvalidDate {
            value, campaign_id, ..
        } = err;
        assert_eq!(value, "not-a-date");
        assert_eq!(campaign_id, "CAMP-2");
    }

    #[test]
    fn test_malformed_conversion_date_aborts_merge() {
        let conversions = vec![raw_conv("2025-13-01", "CAMP-1", 1)];
        let result = merge_raw_stats(&[], &conversions, &range("2025-06-04", "2025-06-04"));
        assert!(result.is_err());
    }
}
