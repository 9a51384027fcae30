//! Worksheet serialization.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{OutputError, Result};
use crate::options::OutputFormat;
use crate::sheet::OtuSheet;

/// SpreadsheetML namespace.
pub const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Worksheet name used in SpreadsheetML output.
pub const WORKSHEET_NAME: &str = "OTUs";

/// File name for the OTU sheet derived from an input sample file.
///
/// The base name is cut at its first `.`: `samples.v2.csv` becomes
/// `samples_OTU.csv` for CSV output.
pub fn otu_file_name(input: &Path, format: OutputFormat) -> String {
    let base = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = base.split('.').next().unwrap_or_default();
    let stem = if stem.is_empty() { "samples" } else { stem };
    format!("{stem}_OTU.{}", format.extension())
}

/// Renders the sheet as CSV text.
pub fn render_csv(sheet: &OtuSheet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&sheet.columns)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| OutputError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Renders the sheet as a SpreadsheetML 2003 workbook.
pub fn render_xls(sheet: &OtuSheet) -> Result<String> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 1);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(OutputError::xml)?;

    let mut workbook = BytesStart::new("Workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:ss", SPREADSHEET_NS));
    xml.write_event(Event::Start(workbook))
        .map_err(OutputError::xml)?;

    let mut worksheet = BytesStart::new("Worksheet");
    worksheet.push_attribute(("ss:Name", WORKSHEET_NAME));
    xml.write_event(Event::Start(worksheet))
        .map_err(OutputError::xml)?;
    xml.write_event(Event::Start(BytesStart::new("Table")))
        .map_err(OutputError::xml)?;

    write_row(&mut xml, &sheet.columns)?;
    for row in &sheet.rows {
        write_row(&mut xml, row)?;
    }

    for name in ["Table", "Worksheet", "Workbook"] {
        xml.write_event(Event::End(BytesEnd::new(name)))
            .map_err(OutputError::xml)?;
    }
    Ok(String::from_utf8_lossy(&xml.into_inner()).into_owned())
}

fn write_row(xml: &mut Writer<Vec<u8>>, cells: &[String]) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("Row")))
        .map_err(OutputError::xml)?;
    for cell in cells {
        xml.write_event(Event::Start(BytesStart::new("Cell")))
            .map_err(OutputError::xml)?;
        let mut data = BytesStart::new("Data");
        data.push_attribute(("ss:Type", "String"));
        xml.write_event(Event::Start(data))
            .map_err(OutputError::xml)?;
        xml.write_event(Event::Text(BytesText::new(cell)))
            .map_err(OutputError::xml)?;
        xml.write_event(Event::End(BytesEnd::new("Data")))
            .map_err(OutputError::xml)?;
        xml.write_event(Event::End(BytesEnd::new("Cell")))
            .map_err(OutputError::xml)?;
    }
    xml.write_event(Event::End(BytesEnd::new("Row")))
        .map_err(OutputError::xml)?;
    Ok(())
}

/// Writes the sheet to `path` in `format`, creating parent directories.
pub fn write_sheet(sheet: &OtuSheet, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Csv => render_csv(sheet)?,
        OutputFormat::Xls => render_xls(sheet)?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), %format, rows = sheet.len(), "wrote OTU sheet");
    Ok(())
}

/// Writes `<dir>/<name>.<ext>` and returns its path.
pub fn write_sheet_named(
    sheet: &OtuSheet,
    dir: &Path,
    name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{}", format.extension()));
    write_sheet(sheet, &path, format)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> OtuSheet {
        OtuSheet {
            columns: vec!["sample_id".into(), "sample_name".into(), "OTU1".into()],
            rows: vec![
                vec!["id-1".into(), "Well, A".into(), String::new()],
                vec!["id-2".into(), "B&C".into(), String::new()],
            ],
        }
    }

    #[test]
    fn test_otu_file_name() {
        assert_eq!(
            otu_file_name(Path::new("/staging/site.v2.csv"), OutputFormat::Csv),
            "site_OTU.csv"
        );
        assert_eq!(
            otu_file_name(Path::new("enigma.xls"), OutputFormat::Xls),
            "enigma_OTU.xls"
        );
    }

    #[test]
    fn test_render_csv() {
        insta::assert_snapshot!(render_csv(&sheet()).unwrap(), @r#"
        sample_id,sample_name,OTU1
        id-1,"Well, A",
        id-2,B&C,
        "#);
    }

    #[test]
    fn test_render_xls_escapes_text() {
        let xml = render_xls(&sheet()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Worksheet ss:Name=\"OTUs\">"));
        assert!(xml.contains("B&amp;C"));
        assert_eq!(xml.matches("<Row>").count(), 3);
    }
}
