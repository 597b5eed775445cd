#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use csv_importer::parser::ParseOptions;
use csv_importer::session::ImportSession;
use csv_importer::target::{TargetField, TargetSchema};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// People schema used across the integration tests.
pub fn people_schema() -> TargetSchema {
    TargetSchema::new(vec![
        TargetField::new("Name", "name").required(),
        TargetField::new("Email", "email"),
        TargetField::new("Age", "age"),
    ])
    .expect("valid schema")
}

pub const PEOPLE_SCHEMA_YAML: &str = "fields:
  - label: Name
    value: name
    required: true
  - label: Email
    value: email
  - label: Age
    value: age
";

pub const PEOPLE_CSV: &str = "name,E-mail,age,notes
Ann,ann@example.com,31,
Bob,,42,likes tea
Cy,cy@example.com,,
";

pub fn load_session(schema: TargetSchema, csv: &str, options: ParseOptions) -> ImportSession {
    let mut session = ImportSession::new(schema);
    session.load(
        Cursor::new(csv.as_bytes().to_vec()),
        Some("people.csv"),
        &options,
        &mut (),
    );
    session
}
