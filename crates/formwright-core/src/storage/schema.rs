pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS blobs (
  key TEXT PRIMARY KEY,
  value_json TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
"#;
