//! Tests for CSV index loading.

use omni_kb_audit::{AuditError, load_index};

const HEADER: &str = "id,name,description,tags,fragment_file\n";

#[test]
fn test_load_preserves_row_count_and_order() -> Result<(), Box<dyn std::error::Error>> {
    let text = format!(
        "{HEADER}a1,Alpha,First fragment,\"foo, bar\",knowledge/a.md\n\
         a2,Beta,Second fragment,bar,knowledge/b.md\n\
         a3,Gamma,Third fragment,,knowledge/c.md\n"
    );
    let loaded = load_index(&text)?;
    assert_eq!(loaded.records.len(), 3);
    let ids: Vec<&str> = loaded.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);
    assert_eq!(loaded.records[0].tags, vec!["foo", "bar"]);
    assert!(loaded.records[2].tags.is_empty());
    assert!(
        loaded
            .records
            .iter()
            .all(|r| r.tags.iter().all(|tag| !tag.is_empty()))
    );
    assert_eq!(loaded.records[1].row, 2);
    Ok(())
}

#[test]
fn test_header_columns_are_order_independent() -> Result<(), Box<dyn std::error::Error>> {
    let text = "fragment_file,tags,id,description,name,owner\n\
                knowledge/a.md,foo,a1,Alpha fragment,Alpha,qa\n";
    let loaded = load_index(text)?;
    let record = &loaded.records[0];
    assert_eq!(record.id, "a1");
    assert_eq!(record.name, "Alpha");
    assert_eq!(record.fragment_file, "knowledge/a.md");
    assert_eq!(record.tags, vec!["foo"]);
    Ok(())
}

#[test]
fn test_missing_required_column_is_fatal() {
    let text = "id,name,description,fragment_file\na1,Alpha,desc,knowledge/a.md\n";
    match load_index(text) {
        Err(AuditError::MalformedIndex { row, column, .. }) => {
            assert_eq!(row, 0);
            assert_eq!(column, "tags");
        }
        other => panic!("expected MalformedIndex, got {other:?}"),
    }
}

#[test]
fn test_row_width_mismatch_is_fatal() {
    let text = format!("{HEADER}a1,Alpha,desc,foo,knowledge/a.md\na2,Beta,desc,knowledge/b.md\n");
    match load_index(&text) {
        Err(AuditError::MalformedIndex { row, .. }) => assert_eq!(row, 2),
        other => panic!("expected MalformedIndex, got {other:?}"),
    }
}

#[test]
fn test_empty_description_is_fatal() {
    let text = format!("{HEADER}a1,Alpha,  ,foo,knowledge/a.md\n");
    match load_index(&text) {
        Err(AuditError::MalformedIndex { row, column, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "description");
        }
        other => panic!("expected MalformedIndex, got {other:?}"),
    }
}

#[test]
fn test_duplicate_ids_are_reported_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let text = format!(
        "{HEADER}dup1,One,desc,foo,knowledge/a.md\n\
         dup1,Two,desc,foo,knowledge/b.md\n\
         dup1,Three,desc,foo,knowledge/c.md\n\
         a4,Four,desc,foo,knowledge/d.md\n"
    );
    let loaded = load_index(&text)?;
    assert_eq!(loaded.records.len(), 4);
    assert_eq!(loaded.duplicate_ids, vec!["dup1"]);
    Ok(())
}

#[test]
fn test_blank_lines_and_bom_are_tolerated() -> Result<(), Box<dyn std::error::Error>> {
    let text = format!("\u{feff}{HEADER}\na1,Alpha,desc,foo,knowledge/a.md\n\n");
    let loaded = load_index(&text)?;
    assert_eq!(loaded.records.len(), 1);
    Ok(())
}
