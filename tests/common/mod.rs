#![allow(dead_code)]

/// Test utilities for building dictionary data and header files
use dict_parser::{ArrayField, CompositeField, Record, TypedField};
use std::fs;
use std::path::{Path, PathBuf};

/// Builder for creating dictionary test files
pub struct DictFileBuilder {
    content: String,
}

impl DictFileBuilder {
    /// Create an empty file builder
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Add a line whose fields are joined with tabs
    pub fn line(self, fields: &[&str]) -> Self {
        self.raw_line(&fields.join("\t"))
    }

    /// Add a line verbatim, followed by `\n`
    pub fn raw_line(mut self, line: &str) -> Self {
        self.content.push_str(line);
        self.content.push('\n');
        self
    }

    /// Add raw text without a line terminator
    pub fn raw(mut self, text: &str) -> Self {
        self.content.push_str(text);
        self
    }

    /// Build the file content
    pub fn build(self) -> String {
        self.content
    }

    /// Write the file into `dir` and return its path
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.content).unwrap();
        path
    }
}

/// Header file content listing the given type names
pub fn header(type_names: &[&str]) -> DictFileBuilder {
    DictFileBuilder::new().line(type_names)
}

/// Schema: name, age, height, items, money (`income,expense`)
pub fn person_record() -> Record {
    let mut money = CompositeField::new("money", ",");
    money.add_field(TypedField::<i32>::new("income")).unwrap();
    money.add_field(TypedField::<i32>::new("expense")).unwrap();

    let mut record = Record::record();
    record.add_field(TypedField::<String>::new("name")).unwrap();
    record.add_field(TypedField::<u32>::new("age")).unwrap();
    record.add_field(TypedField::<i32>::new("height")).unwrap();
    record.add_field(ArrayField::of::<String>("items")).unwrap();
    record.add_field(money).unwrap();
    record
}

/// Data lines for [`person_record`]: three valid lines and two malformed ones
pub fn person_data() -> DictFileBuilder {
    DictFileBuilder::new()
        .line(&["dengyuting", "18", "165", "2:math,art", "100,20"])
        .line(&["zhangsan", "-3", "170", "1:cs", "50,10"])
        .line(&["yinpeng", "30", "182", "3:math,cs,physis", "300,120"])
        .line(&["lisi", "25", "175", "3:a,b", "1,2"])
        .line(&["wangwu", "40", "168", "1:chem", "-5,7"])
}
