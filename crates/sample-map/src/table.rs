//! Mapping table definitions.
//!
//! A [`MappingTable`] drives how one vendor format is interpreted: which
//! source headers map to which canonical fields, how each cell is verified,
//! which fields are dates, and which fields collapse into a group.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::error::MapError;
use crate::format::FileFormat;
use crate::utils::{normalize_text, split_header_unit};
use crate::verify::Verifier;

/// Canonical field holding the sample name.
pub const NAME_FIELD: &str = "name";
/// Canonical field holding the sample description.
pub const DESCRIPTION_FIELD: &str = "description";

/// How a mapped cell is coerced once it passes verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Number with an optional unit suffix (see [`MappingTable::unit_regex`]).
    Quantity,
}

/// One source column of a format.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    /// Header as published in the format's template.
    pub header: &'static str,
    /// Other spellings seen in the wild.
    pub aliases: &'static [&'static str],
    /// Canonical field name.
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub verifier: Option<Verifier>,
}

impl ColumnRule {
    pub fn text(header: &'static str, field: &'static str) -> Self {
        Self {
            header,
            aliases: &[],
            field,
            kind: FieldKind::Text,
            required: false,
            verifier: None,
        }
    }

    pub fn number(header: &'static str, field: &'static str) -> Self {
        Self {
            kind: FieldKind::Number,
            verifier: Some(Verifier::Number {
                min: None,
                max: None,
            }),
            ..Self::text(header, field)
        }
    }

    pub fn quantity(header: &'static str, field: &'static str) -> Self {
        Self {
            kind: FieldKind::Quantity,
            ..Self::text(header, field)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn verify(mut self, verifier: Verifier) -> Self {
        self.verifier = Some(verifier);
        self
    }
}

/// Fields collapsed into one structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

/// Result of matching a file header against a table.
#[derive(Debug, Clone, Copy)]
pub struct HeaderMatch<'a> {
    pub rule: &'a ColumnRule,
    /// Unit annotation found in the header, e.g. `m` in `Depth (m)`.
    pub unit: Option<&'a str>,
}

/// Immutable per-format mapping definition.
#[derive(Debug)]
pub struct MappingTable {
    format: FileFormat,
    header_row_index: usize,
    columns: Vec<ColumnRule>,
    groups: Vec<GroupRule>,
    date_columns: BTreeSet<&'static str>,
    date_grammar: &'static [&'static str],
    unit_regex: Option<Regex>,
    lookup: HashMap<String, usize>,
}

impl MappingTable {
    pub fn builder(format: FileFormat) -> MappingTableBuilder {
        MappingTableBuilder {
            format,
            header_row_index: 0,
            columns: Vec::new(),
            groups: Vec::new(),
            date_columns: BTreeSet::new(),
            date_grammar: &[],
            unit_regex: None,
        }
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Zero-based row holding the column headers.
    pub fn header_row_index(&self) -> usize {
        self.header_row_index
    }

    pub fn columns(&self) -> &[ColumnRule] {
        &self.columns
    }

    /// `(source header, canonical field)` pairs.
    pub fn column_mapping(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.columns.iter().map(|rule| (rule.header, rule.field))
    }

    /// `(canonical field, verifier)` pairs for verified columns.
    pub fn verification_rules(&self) -> impl Iterator<Item = (&'static str, &Verifier)> {
        self.columns
            .iter()
            .filter_map(|rule| rule.verifier.as_ref().map(|verifier| (rule.field, verifier)))
    }

    pub fn groups(&self) -> &[GroupRule] {
        &self.groups
    }

    pub fn date_columns(&self) -> &BTreeSet<&'static str> {
        &self.date_columns
    }

    /// chrono format strings tried, in order, for date columns.
    pub fn date_grammar(&self) -> &'static [&'static str] {
        self.date_grammar
    }

    pub fn unit_regex(&self) -> Option<&Regex> {
        self.unit_regex.as_ref()
    }

    pub fn is_date(&self, field: &str) -> bool {
        self.date_columns.contains(field)
    }

    pub fn rule(&self, field: &str) -> Option<&ColumnRule> {
        self.columns.iter().find(|rule| rule.field == field)
    }

    pub fn group_of(&self, field: &str) -> Option<&GroupRule> {
        self.groups
            .iter()
            .find(|group| group.members.contains(&field))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &ColumnRule> {
        self.columns.iter().filter(|rule| rule.required)
    }

    /// Fields every record of this format carries, in column order.
    ///
    /// Grouped fields are replaced by their group name; the name and
    /// description live on the record itself and are excluded.
    pub fn target_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for rule in &self.columns {
            if rule.field == NAME_FIELD || rule.field == DESCRIPTION_FIELD {
                continue;
            }
            let target = self
                .group_of(rule.field)
                .map_or(rule.field, |group| group.name);
            if !fields.contains(&target) {
                fields.push(target);
            }
        }
        fields
    }

    /// Every header spelling this table recognizes.
    pub fn known_headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .flat_map(|rule| std::iter::once(rule.header).chain(rule.aliases.iter().copied()))
    }

    /// Matches a file header, ignoring case, separators and a trailing unit.
    pub fn match_header<'a>(&'a self, raw: &'a str) -> Option<HeaderMatch<'a>> {
        if let Some(&idx) = self.lookup.get(&normalize_text(raw)) {
            return Some(HeaderMatch {
                rule: &self.columns[idx],
                unit: None,
            });
        }
        let (name, unit) = split_header_unit(raw);
        let unit = unit?;
        let &idx = self.lookup.get(&normalize_text(name))?;
        Some(HeaderMatch {
            rule: &self.columns[idx],
            unit: Some(unit),
        })
    }
}

pub struct MappingTableBuilder {
    format: FileFormat,
    header_row_index: usize,
    columns: Vec<ColumnRule>,
    groups: Vec<GroupRule>,
    date_columns: BTreeSet<&'static str>,
    date_grammar: &'static [&'static str],
    unit_regex: Option<Regex>,
}

impl MappingTableBuilder {
    pub fn header_row(mut self, index: usize) -> Self {
        self.header_row_index = index;
        self
    }

    pub fn column(mut self, rule: ColumnRule) -> Self {
        self.columns.push(rule);
        self
    }

    pub fn group(mut self, name: &'static str, members: &'static [&'static str]) -> Self {
        self.groups.push(GroupRule { name, members });
        self
    }

    pub fn dates(mut self, fields: &[&'static str]) -> Self {
        self.date_columns.extend(fields.iter().copied());
        self
    }

    pub fn date_grammar(mut self, formats: &'static [&'static str]) -> Self {
        self.date_grammar = formats;
        self
    }

    pub fn unit_regex(mut self, regex: Regex) -> Self {
        self.unit_regex = Some(regex);
        self
    }

    /// Checks internal consistency and builds the header lookup.
    pub fn build(self) -> Result<MappingTable, MapError> {
        let format = self.format.to_string();
        if !self.columns.iter().any(|rule| rule.field == NAME_FIELD) {
            return Err(MapError::MissingNameColumn { format });
        }
        for group in &self.groups {
            for member in group.members {
                if !self.columns.iter().any(|rule| rule.field == *member) {
                    return Err(MapError::UnknownGroupMember {
                        format,
                        group: group.name.to_string(),
                        field: (*member).to_string(),
                    });
                }
            }
        }
        for field in &self.date_columns {
            if !self.columns.iter().any(|rule| rule.field == *field) {
                return Err(MapError::UnknownDateColumn {
                    format,
                    field: (*field).to_string(),
                });
            }
        }

        let mut lookup = HashMap::new();
        for (idx, rule) in self.columns.iter().enumerate() {
            for header in std::iter::once(rule.header).chain(rule.aliases.iter().copied()) {
                if lookup.insert(normalize_text(header), idx).is_some() {
                    return Err(MapError::DuplicateHeader {
                        format,
                        header: header.to_string(),
                    });
                }
            }
        }

        Ok(MappingTable {
            format: self.format,
            header_row_index: self.header_row_index,
            columns: self.columns,
            groups: self.groups,
            date_columns: self.date_columns,
            date_grammar: self.date_grammar,
            unit_regex: self.unit_regex,
            lookup,
        })
    }
}
