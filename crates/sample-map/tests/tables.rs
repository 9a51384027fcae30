use sample_map::{FieldKind, FileFormat, NAME_FIELD, closest_match};

#[test]
fn every_format_has_a_required_name_column() {
    for format in FileFormat::ALL {
        let table = format.mapping();
        let required: Vec<_> = table.required_fields().map(|rule| rule.field).collect();
        assert!(required.contains(&NAME_FIELD), "{format} lacks a name column");
        assert!(!table.date_grammar().is_empty());
    }
}

#[test]
fn date_columns_are_text_columns() {
    for format in FileFormat::ALL {
        let table = format.mapping();
        for field in table.date_columns() {
            let rule = table.rule(field).expect("date column is mapped");
            assert_eq!(rule.kind, FieldKind::Text, "{format}.{field}");
        }
    }
}

#[test]
fn sesar_headers_match_loosely() {
    let table = FileFormat::Sesar.mapping();
    assert_eq!(table.match_header("sample_name").unwrap().rule.field, NAME_FIELD);
    assert_eq!(
        table.match_header("STATE / PROVINCE").unwrap().rule.field,
        "state_province"
    );
    assert_eq!(
        table.match_header("Depth in core (min)").unwrap().rule.field,
        "depth_in_core_min"
    );
    assert!(table.match_header("Depth in core (min)").unwrap().unit.is_none());
}

#[test]
fn enigma_targets_group_location() {
    let targets = FileFormat::Enigma.mapping().target_fields();
    assert!(targets.contains(&"location"));
    assert!(!targets.contains(&"latitude"));
    assert!(!targets.contains(&NAME_FIELD));
}

#[test]
fn unit_regex_splits_value_and_unit() {
    let regex = FileFormat::Enigma.mapping().unit_regex().unwrap();
    let caps = regex.captures("5.2 mg/L").unwrap();
    assert_eq!(&caps["value"], "5.2");
    assert_eq!(&caps["unit"], "mg/L");
    let bare = regex.captures("12").unwrap();
    assert!(bare.name("unit").is_none());
}

#[test]
fn unknown_headers_get_suggestions() {
    let table = FileFormat::Enigma.mapping();
    assert_eq!(closest_match("Latitud", table.known_headers()), Some("Latitude"));
}
