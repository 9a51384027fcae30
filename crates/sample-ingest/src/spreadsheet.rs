//! SpreadsheetML 2003 (`<Workbook>` XML) reading.
//!
//! Only the first worksheet is read. Sparse rows and cells written with
//! `ss:Index` are expanded so column positions line up with the headers.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use crate::error::{IngestError, Result};

/// Reads the first worksheet of a SpreadsheetML workbook.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::open(path, e))?;
    parse_workbook(&content).map_err(|err| match err {
        ParseError::NoWorksheet => IngestError::NoWorksheet {
            path: path.to_path_buf(),
        },
        ParseError::Malformed(message) => IngestError::Spreadsheet {
            path: path.to_path_buf(),
            message,
        },
    })
}

#[derive(Debug)]
enum ParseError {
    NoWorksheet,
    Malformed(String),
}

fn malformed(err: impl std::fmt::Display) -> ParseError {
    ParseError::Malformed(err.to_string())
}

fn parse_workbook(content: &str) -> std::result::Result<Vec<Vec<String>>, ParseError> {
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));

    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut seen_worksheet = false;
    let mut in_worksheet = false;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<(usize, String)> = None;
    let mut in_data = false;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Worksheet" if !seen_worksheet => {
                    seen_worksheet = true;
                    in_worksheet = true;
                }
                b"Row" if in_worksheet => {
                    pad_rows(&mut grid, index_attr(&e)?);
                    row = Some(Vec::new());
                }
                b"Cell" if row.is_some() => {
                    let current = row.as_ref().map_or(0, Vec::len);
                    let column = index_attr(&e)?.unwrap_or(current + 1);
                    cell = Some((column, String::new()));
                }
                b"Data" if cell.is_some() => in_data = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Worksheet" if !seen_worksheet => seen_worksheet = true,
                b"Row" if in_worksheet => {
                    pad_rows(&mut grid, index_attr(&e)?);
                    grid.push(Vec::new());
                }
                b"Cell" => {
                    if let Some(cells) = row.as_mut() {
                        let column = index_attr(&e)?.unwrap_or(cells.len() + 1);
                        place_cell(cells, column, String::new());
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_data => {
                if let Some((_, text)) = cell.as_mut() {
                    text.push_str(&t.decode().map_err(malformed)?);
                }
            }
            Event::CData(c) if in_data => {
                if let Some((_, text)) = cell.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::GeneralRef(r) if in_data => {
                if let Some((_, text)) = cell.as_mut() {
                    if let Some(ch) = r.resolve_char_ref().map_err(malformed)? {
                        text.push(ch);
                    } else {
                        let name = r.decode().map_err(malformed)?;
                        let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                            ParseError::Malformed(format!("unknown entity &{name};"))
                        })?;
                        text.push_str(resolved);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Data" => in_data = false,
                b"Cell" => {
                    if let (Some(cells), Some((column, text))) = (row.as_mut(), cell.take()) {
                        place_cell(cells, column, text);
                    }
                }
                b"Row" => {
                    if let Some(cells) = row.take() {
                        grid.push(cells);
                    }
                }
                b"Worksheet" if in_worksheet => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_worksheet {
        return Err(ParseError::NoWorksheet);
    }
    Ok(grid)
}

/// Parses a 1-based `ss:Index` attribute.
fn index_attr(e: &BytesStart<'_>) -> std::result::Result<Option<usize>, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.local_name().as_ref() == b"Index" {
            let value = attr.unescape_value().map_err(malformed)?;
            let index = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|index| *index >= 1)
                .ok_or_else(|| ParseError::Malformed(format!("invalid ss:Index '{value}'")))?;
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn pad_rows(grid: &mut Vec<Vec<String>>, index: Option<usize>) {
    if let Some(index) = index {
        while grid.len() + 1 < index {
            grid.push(Vec::new());
        }
    }
}

fn place_cell(cells: &mut Vec<String>, column: usize, text: String) {
    while cells.len() + 1 < column {
        cells.push(String::new());
    }
    cells.push(text);
}
