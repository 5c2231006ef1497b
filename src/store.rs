// 🗄️ Record Store - parsed article table
// Loaded once, normalized once, never mutated afterwards

use crate::error::{DateParseError, LoadError, SchemaError};
use crate::list_codec::ListFormat;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "source",
    "headline",
    "date",
    "countries",
    "sentiment",
    "subjectivity",
    "entities",
    "category",
    "people",
];

// ============================================================================
// RECORD
// ============================================================================

/// One article with its list fields already decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub source: String,
    pub headline: String,
    pub date: NaiveDate,
    pub countries: Vec<String>,
    pub sentiment: f64,
    pub subjectivity: f64,
    pub entities: Vec<String>,
    pub category: String,
    pub people: Vec<String>,
}

/// A row exactly as it appears in the input, before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub source: String,
    pub headline: String,
    pub date: String,
    pub countries: String,
    pub sentiment: String,
    pub subjectivity: String,
    pub entities: String,
    pub category: String,
    pub people: String,
}

impl RawRecord {
    /// Normalize one raw row. `row` is the 1-based data row used in errors.
    pub fn normalize(&self, row: usize, format: ListFormat) -> Result<Record, LoadError> {
        let date = parse_day(&self.date).ok_or_else(|| DateParseError {
            row,
            value: self.date.clone(),
        })?;

        Ok(Record {
            source: self.source.trim().to_string(),
            headline: self.headline.clone(),
            date,
            countries: decode_list(row, "countries", &self.countries, format)?,
            sentiment: parse_score(row, "sentiment", &self.sentiment)?,
            subjectivity: parse_score(row, "subjectivity", &self.subjectivity)?,
            entities: decode_list(row, "entities", &self.entities, format)?,
            category: self.category.trim().to_string(),
            people: decode_list(row, "people", &self.people, format)?,
        })
    }
}

fn decode_list(
    row: usize,
    column: &str,
    value: &str,
    format: ListFormat,
) -> Result<Vec<String>, SchemaError> {
    format.decode(value).map_err(|reason| SchemaError::MalformedList {
        row,
        column: column.to_string(),
        value: value.to_string(),
        reason,
    })
}

fn parse_score(row: usize, column: &str, value: &str) -> Result<f64, SchemaError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SchemaError::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Resolve an ISO-like date or timestamp to its calendar day
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(day);
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts.date());
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()
}

// ============================================================================
// LOAD OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Field delimiter byte (tab for the TSV export)
    pub delimiter: u8,
    pub list_format: ListFormat,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: b'\t',
            list_format: ListFormat::Literal,
        }
    }
}

// ============================================================================
// RECORD TABLE
// ============================================================================

/// Immutable, ordered article table
///
/// Category and source vocabularies are captured in first-seen order at
/// construction. They define the closed world a query can select from.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<Record>,
    categories: Vec<String>,
    sources: Vec<String>,
    category_rank: HashMap<String, usize>,
    source_rank: HashMap<String, usize>,
    date_span: Option<(NaiveDate, NaiveDate)>,
}

impl RecordTable {
    /// Build a table from already-normalized records
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut categories = Vec::new();
        let mut sources = Vec::new();
        let mut category_rank = HashMap::new();
        let mut source_rank = HashMap::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for record in &records {
            if !category_rank.contains_key(&record.category) {
                category_rank.insert(record.category.clone(), categories.len());
                categories.push(record.category.clone());
            }
            if !source_rank.contains_key(&record.source) {
                source_rank.insert(record.source.clone(), sources.len());
                sources.push(record.source.clone());
            }
            date_span = Some(match date_span {
                None => (record.date, record.date),
                Some((lo, hi)) => (lo.min(record.date), hi.max(record.date)),
            });
        }

        RecordTable {
            records,
            categories,
            sources,
            category_rank,
            source_rank,
            date_span,
        }
    }

    /// Normalize raw rows into a table. Any bad row rejects the whole load.
    pub fn from_raw(rows: &[RawRecord], format: ListFormat) -> Result<Self, LoadError> {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, raw)| raw.normalize(i + 1, format))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_records(records))
    }

    /// Read a delimited table with a header row
    pub fn load<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(SchemaError::MissingColumn {
                    column: column.to_string(),
                }
                .into());
            }
        }

        let mut records = Vec::new();
        for (i, result) in rdr.deserialize::<RawRecord>().enumerate() {
            let raw = result?;
            records.push(raw.normalize(i + 1, options.list_format)?);
        }

        let table = Self::from_records(records);

        info!(
            rows = table.len(),
            categories = table.categories.len(),
            sources = table.sources.len(),
            list_format = options.list_format.version(),
            span = ?table.date_span,
            "record table loaded"
        );

        Ok(table)
    }

    /// Open and read a dataset file
    pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        debug!(path = %path.display(), "opening dataset");
        let file = File::open(path)?;
        Self::load(file, options)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Categories in first-seen order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Sources in first-seen order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Position of a category in first-seen order
    pub fn category_rank(&self, category: &str) -> Option<usize> {
        self.category_rank.get(category).copied()
    }

    pub fn source_rank(&self, source: &str) -> Option<usize> {
        self.source_rank.get(source).copied()
    }

    /// Earliest and latest day present
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_span
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Helper function to create test records with all required fields
    pub(crate) fn create_test_record(source: &str, category: &str, date: &str) -> Record {
        Record {
            source: source.to_string(),
            headline: format!("{} reports on {}", source, category),
            date: day(date),
            countries: Vec::new(),
            sentiment: 0.0,
            subjectivity: 0.0,
            entities: Vec::new(),
            category: category.to_string(),
            people: Vec::new(),
        }
    }

    const HEADER: &str =
        "source\theadline\tdate\tcountries\tsentiment\tsubjectivity\tentities\tcategory\tpeople";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_load_normalizes_lists_once() {
        let data = tsv(&[
            "NZZ\tKrieg in der Ukraine\t2022-02-24\t['Ukraine', 'Russia']\t-0.4\t0.6\t['Krieg', 'Ukraine']\tInternational\t['Putin']",
            "SRF\tSki-WM\t2022-02-25 00:00:00\t[]\t0.3\t0.2\t[]\tSport\t[]",
        ]);

        let table = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(table.len(), 2);
        let first = table.get(0).unwrap();
        assert_eq!(first.countries, vec!["Ukraine", "Russia"]);
        assert_eq!(first.people, vec!["Putin"]);
        assert_eq!(first.date, day("2022-02-24"));

        let second = table.get(1).unwrap();
        assert!(second.countries.is_empty());
        assert_eq!(second.date, day("2022-02-25"));

        assert_eq!(table.categories(), &["International", "Sport"]);
        assert_eq!(table.sources(), &["NZZ", "SRF"]);
        assert_eq!(table.date_span(), Some((day("2022-02-24"), day("2022-02-25"))));
    }

    #[test]
    fn test_load_ignores_extra_columns() {
        let data = "source\theadline\tdate\tcountries\tsentiment\tsubjectivity\tentities\tcategory\tcountries_en\tpeople\n\
                    NZZ\tH\t2022-01-03\t['Schweiz']\t0.1\t0.1\t[]\tSchweiz\t['Switzerland']\t[]";

        let table = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.get(0).unwrap().countries, vec!["Schweiz"]);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "source\theadline\tdate\tcountries\tsentiment\tsubjectivity\tentities\tcategory\n\
                    NZZ\tH\t2022-01-03\t[]\t0.1\t0.1\t[]\tSchweiz";

        let err = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap_err();

        match err {
            LoadError::Schema(SchemaError::MissingColumn { column }) => assert_eq!(column, "people"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_list_rejects_load() {
        let data = tsv(&[
            "NZZ\tH\t2022-01-03\t[]\t0.1\t0.1\t[]\tSchweiz\t[]",
            "NZZ\tH\t2022-01-03\t['a'\t0.1\t0.1\t[]\tSchweiz\t[]",
        ]);

        let err = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap_err();

        match err {
            LoadError::Schema(SchemaError::MalformedList { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "countries");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_date_rejects_load() {
        let data = tsv(&["NZZ\tH\tyesterday\t[]\t0.1\t0.1\t[]\tSchweiz\t[]"]);

        let err = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            LoadError::DateParse(DateParseError { row: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let data = tsv(&["NZZ\tH\t2022-01-03\t[]\tnan\t0.1\t[]\tSchweiz\t[]"]);

        let err = RecordTable::load(data.as_bytes(), &LoadOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_delimited_format() {
        let data = "source,headline,date,countries,sentiment,subjectivity,entities,category,people\n\
                    SRF,H,2022-03-01,Schweiz|Italien,0.0,0.5,,Schweiz,Ignazio Cassis";
        let options = LoadOptions {
            delimiter: b',',
            list_format: ListFormat::Delimited { separator: '|' },
        };

        let table = RecordTable::load(data.as_bytes(), &options).unwrap();
        let record = table.get(0).unwrap();

        assert_eq!(record.countries, vec!["Schweiz", "Italien"]);
        assert!(record.entities.is_empty());
        assert_eq!(record.people, vec!["Ignazio Cassis"]);
    }

    #[test]
    fn test_from_raw_rows() {
        let raw = RawRecord {
            source: "Blick".to_string(),
            headline: "H".to_string(),
            date: "2022-05-01".to_string(),
            countries: "['Schweiz']".to_string(),
            sentiment: "0.5".to_string(),
            subjectivity: "1".to_string(),
            entities: "['Bern']".to_string(),
            category: "Schweiz".to_string(),
            people: "[]".to_string(),
        };

        let table = RecordTable::from_raw(&[raw], ListFormat::Literal).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().subjectivity, 1.0);
    }

    #[test]
    fn test_load_path_and_sample_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", include_str!("../data/sample_articles.tsv")).unwrap();

        let table = RecordTable::load_path(file.path(), &LoadOptions::default()).unwrap();

        println!(
            "Loaded {} records, {} categories, {} sources",
            table.len(),
            table.categories().len(),
            table.sources().len()
        );
        assert!(table.len() >= 10);
        assert!(!table.categories().is_empty());
        println!("✅ Sample dataset load PASSED");
    }

    #[test]
    fn test_parse_day_formats() {
        assert_eq!(parse_day("2022-02-24"), Some(day("2022-02-24")));
        assert_eq!(parse_day("2022-02-24T13:45:00"), Some(day("2022-02-24")));
        assert_eq!(parse_day("2022-02-24T13:45:00+01:00"), Some(day("2022-02-24")));
        assert_eq!(parse_day("24.02.2022"), Some(day("2022-02-24")));
        assert_eq!(parse_day("2022-02-30"), None);
    }
}
