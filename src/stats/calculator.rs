//! Statistics Calculator Module
//! Percentage shares, year-over-year variation, top-N ranking and number formatting.

use crate::data::IndicatorRow;
use std::cmp::Ordering;

/// One category's share of a total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: f64,
    pub percent: f64,
}

/// Percentage change of one variable between two consecutive years.
///
/// `percent` is `None` when the change is undefined (prior value zero or missing).
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub variable: String,
    pub period: String,
    pub percent: Option<f64>,
}

/// Arithmetic over extracted table values.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Share of each value in the sum of all values, in input order.
    ///
    /// A zero total yields 0% for every entry.
    pub fn percentage_shares(values: &[(String, f64)]) -> Vec<Share> {
        let total: f64 = values.iter().map(|(_, v)| v).sum();

        values
            .iter()
            .map(|(label, count)| Share {
                label: label.clone(),
                count: *count,
                percent: if total == 0.0 {
                    0.0
                } else {
                    count / total * 100.0
                },
            })
            .collect()
    }

    /// Stable ascending sort by raw count.
    pub fn sort_by_count_ascending(shares: &mut [Share]) {
        shares.sort_by(|a, b| a.count.partial_cmp(&b.count).unwrap_or(Ordering::Equal));
    }

    /// (curr - prev) / prev * 100, undefined when prev is zero or either value is missing.
    pub fn percent_change(prev: Option<f64>, curr: Option<f64>) -> Option<f64> {
        match (prev, curr) {
            (Some(prev), Some(curr)) if prev != 0.0 => Some((curr - prev) / prev * 100.0),
            _ => None,
        }
    }

    /// Year-over-year variation for every row across every consecutive pair of years.
    ///
    /// `years` labels the row values; pairs are formed after ordering the years
    /// numerically. Output is long format, period-major, labelled "<curr> vs <prev>".
    pub fn year_over_year(rows: &[IndicatorRow], years: &[String]) -> Vec<Variation> {
        let mut order: Vec<usize> = (0..years.len()).collect();
        order.sort_by(|&a, &b| years[a].cmp(&years[b]));

        order
            .windows(2)
            .flat_map(|pair| {
                let (prev, curr) = (pair[0], pair[1]);
                let period = format!("{} vs {}", years[curr], years[prev]);
                rows.iter().map(move |row| Variation {
                    variable: row.variable.clone(),
                    period: period.clone(),
                    percent: Self::percent_change(
                        row.values.get(prev).copied().flatten(),
                        row.values.get(curr).copied().flatten(),
                    ),
                })
            })
            .collect()
    }

    /// The `n` largest values. Ties keep input order.
    pub fn top_n(values: &[(String, f64)], n: usize) -> Vec<(String, f64)> {
        let mut ranked = values.to_vec();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(n);
        ranked
    }

    /// Round to an integer and group thousands with commas: 350000 -> "350,000".
    pub fn format_count(value: f64) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }

        let rounded = value.round();
        let digits = format!("{}", rounded.abs() as u64);
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if rounded < 0.0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }
}
