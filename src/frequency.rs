use itertools::Itertools;

use crate::series::Series;

/// Counts occurrences of each present value, skipping missing ones.
///
/// Results are ordered by count descending, ties broken by value.
pub fn value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut items = values
        .into_iter()
        .flatten()
        .counts()
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

/// Top `top` most frequent values as a series (`0` keeps all).
pub fn top_values<'a, I>(name: &str, values: I, top: usize) -> Series
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    Series::from_counts(name, value_counts(values)).head(top)
}

/// Share of each present value as a percentage of all present values.
pub fn value_shares<'a, I>(name: &str, values: I) -> Series
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let counts = value_counts(values);
    let total = counts.iter().map(|(_, count)| *count).sum::<usize>();
    Series::from_pairs(
        name,
        counts.into_iter().map(|(value, count)| {
            (
                value,
                crate::data::percentage(count as f64, total as f64),
            )
        }),
    )
}
