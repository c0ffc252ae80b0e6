use std::collections::BTreeMap;

use asset_diff::ChangeVector;
use chrono::NaiveDate;

use crate::domain::entity::AggregatedChangeInfo;

/// 按 UTC 日期统计变更数，日期升序
pub fn aggregate_by_day<'a>(
    vectors: impl IntoIterator<Item = &'a ChangeVector>,
) -> Vec<AggregatedChangeInfo> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for vector in vectors {
        *per_day.entry(vector.timestamp().date_naive()).or_default() += 1;
    }
    per_day.into_iter().map(|(date, count)| AggregatedChangeInfo { date, count }).collect()
}
