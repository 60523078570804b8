use super::super::domain::MappingEntry;

/// Parse `score,value` rows. The first physical line is always treated as a header, and rows
/// that are blank or do not hold exactly two numeric fields are skipped.
pub fn parse_mapping(text: &str) -> Vec<MappingEntry> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .records()
        .filter_map(Result::ok)
        .filter(|record| record.position().map_or(false, |pos| pos.line() > 1))
        .filter_map(|record| entry_from_record(&record))
        .collect()
}

fn entry_from_record(record: &csv::StringRecord) -> Option<MappingEntry> {
    if record.len() != 2 {
        return None;
    }

    let score = parse_number(record.get(0)?)?;
    let value = parse_number(record.get(1)?)?;
    Some(MappingEntry { score, value })
}

fn parse_number(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
pub(crate) fn parse_number_for_tests(field: &str) -> Option<f64> {
    parse_number(field)
}
