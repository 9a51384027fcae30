//! Sample-sheet import: raw grid + mapping table → sample set.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use sample_ingest::{RawRow, RawTable, read_table};
use sample_map::{
    ColumnRule, DESCRIPTION_FIELD, FieldKind, MappingTable, NAME_FIELD, closest_match,
};
use sample_model::{
    CellIssue, FieldValue, IssueReason, SampleId, SampleRecord, SampleSet, ValidationReport,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::datetime::normalize_date;
use crate::error::{FormatError, ImportError, MissingColumn, Result};
use crate::units::parse_quantity;

/// What to do with rows that fail verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Drop failing rows and report them alongside the sample set.
    #[default]
    Lenient,
    /// Any issue fails the whole import.
    Strict,
}

/// Per-call import settings.
#[derive(Debug, Clone)]
pub struct ImportParams {
    pub set_name: String,
    pub description: String,
    /// Upper bound on reading the input file.
    pub timeout: Duration,
    pub policy: ValidationPolicy,
}

impl ImportParams {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            description: String::new(),
            timeout: Duration::from_secs(60),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A source column that matched nothing in the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedColumn {
    pub header: String,
    /// Closest known header, when one is similar enough.
    pub suggestion: Option<String>,
}

/// Successful import: the sample set plus everything that was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub sample_set: SampleSet,
    pub issues: ValidationReport,
    pub unmapped_columns: Vec<UnmappedColumn>,
}

impl ImportOutcome {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Fails with [`ImportError::Validation`] if any row was dropped.
    pub fn into_strict(self) -> Result<Self> {
        if self.issues.is_empty() {
            Ok(self)
        } else {
            Err(ImportError::Validation(self.issues))
        }
    }
}

/// Reads `path` and imports it with `table`.
pub fn import_samples(
    path: &Path,
    table: &MappingTable,
    params: &ImportParams,
) -> Result<ImportOutcome> {
    let span = info_span!("import", format = %table.format(), path = %path.display());
    let _guard = span.enter();
    let raw = read_table(path, table.header_row_index(), params.timeout)?;
    import_table(&raw, table, params)
}

/// A file column bound to a mapping rule.
#[derive(Debug)]
struct BoundColumn<'a> {
    index: usize,
    header: &'a str,
    rule: &'a ColumnRule,
    header_unit: Option<&'a str>,
}

/// Imports an already-read grid.
pub fn import_table(
    raw: &RawTable,
    table: &MappingTable,
    params: &ImportParams,
) -> Result<ImportOutcome> {
    let (columns, unmapped_columns) = bind_columns(raw, table)?;

    let mut issues = Vec::new();
    let mut samples = Vec::new();
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut ids: HashSet<SampleId> = HashSet::new();
    let name_header = columns
        .iter()
        .find(|column| column.rule.field == NAME_FIELD)
        .map_or(NAME_FIELD, |column| column.header);

    for row in &raw.rows {
        let values = match convert_row(row, &columns, table) {
            Ok(values) => values,
            Err(row_issues) => {
                debug!(row = row.number, issues = row_issues.len(), "dropping row");
                issues.extend(row_issues);
                continue;
            }
        };

        let name = match values.get(NAME_FIELD) {
            Some(FieldValue::Text(name)) => name.clone(),
            _ => {
                issues.push(CellIssue::new(row.number, name_header, IssueReason::Required));
                continue;
            }
        };
        if let Some(&first_row) = names.get(&name) {
            debug!(row = row.number, name = %name, "duplicate sample name");
            issues.push(CellIssue::new(
                row.number,
                name_header,
                IssueReason::DuplicateName {
                    value: name,
                    first_row,
                },
            ));
            continue;
        }
        names.insert(name.clone(), row.number);

        let id = unique_id(&mut ids);
        samples.push(build_record(id, name, values, table));
    }

    let issues = ValidationReport::new(issues);
    if samples.is_empty() {
        warn!(issues = issues.len(), "no samples survived validation");
        return Err(ImportError::Empty { issues });
    }
    info!(
        samples = samples.len(),
        dropped_rows = issues.failed_rows().len(),
        unmapped = unmapped_columns.len(),
        "import complete"
    );

    let outcome = ImportOutcome {
        sample_set: SampleSet::new(&params.set_name, &params.description, samples),
        issues,
        unmapped_columns,
    };
    match params.policy {
        ValidationPolicy::Lenient => Ok(outcome),
        ValidationPolicy::Strict => outcome.into_strict(),
    }
}

fn bind_columns<'a>(
    raw: &'a RawTable,
    table: &'a MappingTable,
) -> Result<(Vec<BoundColumn<'a>>, Vec<UnmappedColumn>)> {
    let mut columns: Vec<BoundColumn<'a>> = Vec::new();
    let mut unmapped = Vec::new();

    for (index, header) in raw.headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        match table.match_header(header) {
            Some(found) if columns.iter().any(|c| c.rule.field == found.rule.field) => {
                warn!(header = %header, field = found.rule.field, "column mapped twice; ignoring");
                unmapped.push(UnmappedColumn {
                    header: header.clone(),
                    suggestion: None,
                });
            }
            Some(found) => columns.push(BoundColumn {
                index,
                header,
                rule: found.rule,
                header_unit: found.unit,
            }),
            None => {
                let suggestion = closest_match(header, table.known_headers()).map(str::to_string);
                debug!(header = %header, suggestion = ?suggestion, "unmapped column");
                unmapped.push(UnmappedColumn {
                    header: header.clone(),
                    suggestion,
                });
            }
        }
    }

    if columns.is_empty() {
        return Err(FormatError::NoMappedColumns {
            format: table.format(),
            headers: raw.headers.clone(),
        }
        .into());
    }

    let missing: Vec<MissingColumn> = table
        .required_fields()
        .filter(|rule| !columns.iter().any(|c| c.rule.field == rule.field))
        .map(|rule| MissingColumn {
            header: rule.header.to_string(),
            suggestion: closest_match(
                rule.header,
                unmapped.iter().map(|column| column.header.as_str()),
            )
            .map(str::to_string),
        })
        .collect();
    if !missing.is_empty() {
        return Err(FormatError::MissingRequiredColumns {
            format: table.format(),
            missing,
        }
        .into());
    }

    Ok((columns, unmapped))
}

/// Verifies and converts every mapped cell of a row.
fn convert_row(
    row: &RawRow,
    columns: &[BoundColumn<'_>],
    table: &MappingTable,
) -> std::result::Result<BTreeMap<&'static str, FieldValue>, Vec<CellIssue>> {
    let mut values = BTreeMap::new();
    let mut issues = Vec::new();

    for column in columns {
        let cell = row.cell(column.index);
        if cell.is_empty() {
            if column.rule.required {
                issues.push(CellIssue::new(row.number, column.header, IssueReason::Required));
            }
            values.insert(column.rule.field, FieldValue::Absent);
            continue;
        }
        match convert_cell(cell, column, table) {
            Ok(value) => {
                values.insert(column.rule.field, value);
            }
            Err(reason) => issues.push(CellIssue::new(row.number, column.header, reason)),
        }
    }

    if issues.is_empty() { Ok(values) } else { Err(issues) }
}

fn convert_cell(
    cell: &str,
    column: &BoundColumn<'_>,
    table: &MappingTable,
) -> std::result::Result<FieldValue, IssueReason> {
    let rule = column.rule;

    if table.is_date(rule.field) {
        return normalize_date(cell, table.date_grammar())
            .map(FieldValue::Date)
            .ok_or_else(|| IssueReason::UnparseableDate {
                value: cell.to_string(),
            });
    }

    match rule.kind {
        FieldKind::Quantity => {
            let quantity = parse_quantity(cell, table.unit_regex(), column.header_unit)?;
            if let Some(verifier) = &rule.verifier {
                verifier.check_number(quantity.value)?;
            }
            Ok(match quantity.unit {
                Some(unit) => FieldValue::Quantity {
                    value: quantity.value,
                    unit,
                },
                None => FieldValue::Number(quantity.value),
            })
        }
        FieldKind::Number => {
            if let Some(verifier) = &rule.verifier {
                verifier.check(cell)?;
            }
            sample_map::parse_number(cell)
                .map(FieldValue::Number)
                .ok_or_else(|| IssueReason::NotANumber {
                    value: cell.to_string(),
                })
        }
        FieldKind::Text => match &rule.verifier {
            Some(verifier) => {
                verifier.check(cell)?;
                let canonical = verifier.canonical_term(cell).unwrap_or(cell);
                Ok(FieldValue::Text(canonical.to_string()))
            }
            None => Ok(FieldValue::Text(cell.to_string())),
        },
    }
}

fn unique_id(used: &mut HashSet<SampleId>) -> SampleId {
    loop {
        let id = SampleId::generate();
        if used.insert(id.clone()) {
            return id;
        }
    }
}

/// Builds a record carrying every target field of the table.
fn build_record(
    id: SampleId,
    name: String,
    mut values: BTreeMap<&'static str, FieldValue>,
    table: &MappingTable,
) -> SampleRecord {
    let mut record = SampleRecord::new(id, name);
    record.description = match values.remove(DESCRIPTION_FIELD) {
        Some(FieldValue::Text(text)) => Some(text),
        _ => None,
    };

    for target in table.target_fields() {
        let value = match table.groups().iter().find(|group| group.name == target) {
            Some(group) => {
                let members: BTreeMap<String, FieldValue> = group
                    .members
                    .iter()
                    .filter_map(|member| {
                        values
                            .remove(member)
                            .filter(|value| !value.is_absent())
                            .map(|value| ((*member).to_string(), value))
                    })
                    .collect();
                if members.is_empty() {
                    FieldValue::Absent
                } else {
                    FieldValue::Group(members)
                }
            }
            None => values.remove(target).unwrap_or(FieldValue::Absent),
        };
        record.set_field(target, value);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_map::FileFormat;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut grid: Vec<Vec<String>> = vec![headers.iter().map(|h| h.to_string()).collect()];
        grid.extend(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect()),
        );
        RawTable::from_grid(Path::new("test.csv"), grid, 0).unwrap()
    }

    fn params() -> ImportParams {
        ImportParams::new("set")
    }

    #[test]
    fn test_every_target_field_present() {
        let table = FileFormat::Enigma.mapping();
        let outcome = import_table(
            &raw(&["Name", "Latitude"], &[&["S1", "45.0"], &["S2", ""]]),
            table,
            &params(),
        )
        .unwrap();
        for sample in &outcome.sample_set.samples {
            for target in table.target_fields() {
                assert!(sample.field(target).is_some(), "{target} missing");
            }
        }
        assert!(matches!(
            outcome.sample_set.samples[0].field("location"),
            Some(FieldValue::Group(_))
        ));
        assert_eq!(
            outcome.sample_set.samples[1].field("location"),
            Some(&FieldValue::Absent)
        );
    }

    #[test]
    fn test_header_unit_applies_to_bare_numbers() {
        let outcome = import_table(
            &raw(&["Name", "Depth (m)"], &[&["S1", "12"], &["S2", "3 ft"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap();
        let samples = &outcome.sample_set.samples;
        assert_eq!(
            samples[0].field("depth"),
            Some(&FieldValue::Quantity {
                value: 12.0,
                unit: "m".to_string()
            })
        );
        assert_eq!(
            samples[1].field("depth"),
            Some(&FieldValue::Quantity {
                value: 3.0,
                unit: "ft".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_names_are_row_issues() {
        let outcome = import_table(
            &raw(&["Name"], &[&["S1"], &["S2"], &["S1"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap();
        assert_eq!(outcome.sample_set.len(), 2);
        assert_eq!(outcome.issues.len(), 1);
        let issue = &outcome.issues.issues[0];
        assert_eq!(issue.row, 3);
        assert_eq!(
            issue.reason,
            IssueReason::DuplicateName {
                value: "S1".to_string(),
                first_row: 1
            }
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let outcome = import_table(
            &raw(&["Name"], &[&["a"], &["b"], &["c"], &["d"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap();
        let ids: HashSet<_> = outcome.sample_set.sample_ids().collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_vocabulary_is_canonicalized() {
        let outcome = import_table(
            &raw(&["Name", "Material"], &[&["S1", "soil"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap();
        assert_eq!(
            outcome.sample_set.samples[0].field("material"),
            Some(&FieldValue::Text("Soil".to_string()))
        );
    }

    #[test]
    fn test_no_mapped_columns() {
        let err = import_table(
            &raw(&["Foo", "Bar"], &[&["1", "2"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Format(FormatError::NoMappedColumns { .. })
        ));
    }

    #[test]
    fn test_missing_required_column_suggests() {
        let err = import_table(
            &raw(&["Sampl Nme", "Latitude"], &[&["S1", "1"]]),
            FileFormat::Sesar.mapping(),
            &params(),
        )
        .unwrap_err();
        let ImportError::Format(FormatError::MissingRequiredColumns { missing, .. }) = err else {
            panic!("expected missing required column, got {err:?}");
        };
        assert_eq!(missing[0].header, "Sample Name");
        assert_eq!(missing[0].suggestion.as_deref(), Some("Sampl Nme"));
    }

    #[test]
    fn test_all_rows_dropped_is_empty_error() {
        let err = import_table(
            &raw(&["Name", "Latitude"], &[&["S1", "200"]]),
            FileFormat::Enigma.mapping(),
            &params(),
        )
        .unwrap_err();
        let ImportError::Empty { issues } = err else {
            panic!("expected empty import");
        };
        assert_eq!(issues.issues[0].reason.code(), "out-of-range");
    }

    #[test]
    fn test_strict_policy_rejects_issues() {
        let err = import_table(
            &raw(&["Name", "pH"], &[&["S1", "7"], &["S2", "15"]]),
            FileFormat::Enigma.mapping(),
            &params().with_policy(ValidationPolicy::Strict),
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::Validation(report) if report.len() == 1));
    }
}
