//! Multi-line text blocks edited as one string and stored as lines or lists.

/// Split an edit block into trimmed, non-empty lines (order kept).
///
/// `\n`, `\r\n`, and a lone `\r` all count as line breaks.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join list entries into an edit block.
#[must_use]
pub fn join_lines<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Age filter option: age in months plus a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeOption {
    /// Age in months.
    pub months: u32,
    /// Display label.
    pub label: String,
}

/// Week filter option: a start date plus a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekOption {
    /// Start date as written (e.g. `8-6-2020`).
    pub date: String,
    /// Display label.
    pub label: String,
}

/// Duration filter option: length in days plus a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationOption {
    /// Length in days.
    pub days: u32,
    /// Display label.
    pub label: String,
}

fn split_pair(line: &str, separator: char) -> Option<(&str, &str)> {
    let (key, label) = line.split_once(separator)?;
    let (key, label) = (key.trim(), label.trim());
    if key.is_empty() || label.is_empty() {
        None
    } else {
        Some((key, label))
    }
}

/// Parse the ages mapping (`"<months>,<label>"` per line). Malformed lines are skipped.
#[must_use]
pub fn parse_age_options(ages: &str) -> Vec<AgeOption> {
    split_lines(ages)
        .iter()
        .filter_map(|line| {
            let (months, label) = split_pair(line, ',')?;
            Some(AgeOption {
                months: months.parse().ok()?,
                label: label.to_string(),
            })
        })
        .collect()
}

/// Parse the weeks mapping. Each line holds `date,label` pairs separated by
/// commas; a dangling item without a label is dropped.
#[must_use]
pub fn parse_week_options(weeks: &str) -> Vec<WeekOption> {
    let mut options = Vec::new();
    for line in split_lines(weeks) {
        let items: Vec<&str> = line.split(',').map(str::trim).collect();
        for pair in items.chunks_exact(2) {
            if let [date, label] = pair
                && !date.is_empty()
                && !label.is_empty()
            {
                options.push(WeekOption {
                    date: (*date).to_string(),
                    label: (*label).to_string(),
                });
            }
        }
    }
    options
}

/// Parse the durations mapping (`"<days>|<label>"` per line). Malformed lines are skipped.
#[must_use]
pub fn parse_duration_options(durations: &str) -> Vec<DurationOption> {
    split_lines(durations)
        .iter()
        .filter_map(|line| {
            let (days, label) = split_pair(line, '|')?;
            Some(DurationOption {
                days: days.parse().ok()?,
                label: label.to_string(),
            })
        })
        .collect()
}
