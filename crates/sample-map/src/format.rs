use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::formats::{enigma, sesar};
use crate::table::MappingTable;

static ENIGMA: LazyLock<MappingTable> =
    LazyLock::new(|| enigma::table().expect("Invalid ENIGMA mapping table"));
static SESAR: LazyLock<MappingTable> =
    LazyLock::new(|| sesar::table().expect("Invalid SESAR mapping table"));

/// Supported vendor formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    Enigma,
    Sesar,
}

impl FileFormat {
    pub const ALL: [FileFormat; 2] = [FileFormat::Enigma, FileFormat::Sesar];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Enigma => "ENIGMA",
            FileFormat::Sesar => "SESAR",
        }
    }

    /// The process-wide mapping table for this format.
    pub fn mapping(&self) -> &'static MappingTable {
        match self {
            FileFormat::Enigma => &ENIGMA,
            FileFormat::Sesar => &SESAR,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENIGMA" => Ok(FileFormat::Enigma),
            "SESAR" => Ok(FileFormat::Sesar),
            _ => Err(MapError::UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format_names() {
        assert_eq!("sesar".parse::<FileFormat>().unwrap(), FileFormat::Sesar);
        assert_eq!(" ENIGMA ".parse::<FileFormat>().unwrap(), FileFormat::Enigma);
        assert_eq!(
            "igsn".parse::<FileFormat>().unwrap_err(),
            MapError::UnknownFormat("igsn".to_string())
        );
    }

    #[test]
    fn header_rows_differ_per_format() {
        assert_eq!(FileFormat::Enigma.mapping().header_row_index(), 0);
        assert_eq!(FileFormat::Sesar.mapping().header_row_index(), 1);
    }
}
