mod common;

use common::{person_data, person_record};
use dict_parser::{writer, JsonLinesWriter, RecordStream};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_write_parsed_records_as_json_lines() {
    let dir = tempdir().unwrap();
    let data_path = person_data().write(dir.path(), "demo.txt");
    let output_path = dir.path().join("out").join("records.jsonl");

    let mut stream = RecordStream::new(&data_path, person_record);
    stream.parse_file().unwrap();

    let stats = JsonLinesWriter::new(&output_path)
        .write_with_stats(stream.records())
        .unwrap();
    assert_eq!(stats.num_records, 3);

    let text = fs::read_to_string(&output_path).unwrap();
    assert_eq!(stats.num_bytes as usize, text.len());

    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["name"], "dengyuting");
    assert_eq!(lines[0]["items"], serde_json::json!(["math", "art"]));
    assert_eq!(lines[1]["money"]["expense"], 120);
}

#[test]
fn test_write_to_any_writer() {
    let mut stream = RecordStream::new("unused", person_record);
    stream.parse_str("a\t1\t2\t1:x\t3,4\n");

    let mut out = Vec::new();
    let stats = writer::write_json_lines(&mut out, stream.records(), false).unwrap();

    assert_eq!(stats.summary(), format!("Wrote 1 records ({} bytes)", out.len()));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"name\":\"a\",\"age\":1,\"height\":2,\"items\":[\"x\"],\"money\":{\"income\":3,\"expense\":4}}\n"
    );
}

#[test]
fn test_write_empty_record_list() {
    let dir = tempdir().unwrap();
    let output_path = dir.path().join("empty.jsonl");

    JsonLinesWriter::new(&output_path).write(&[]).unwrap();
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "");
}
