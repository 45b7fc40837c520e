// Tue Jan 13 2026 - Alex

use crate::output::OutputError;
use crate::pattern::ScanMatch;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonSerializer {
    pretty_print: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self {
            pretty_print: false,
        }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// The whole result set as one JSON array.
    pub fn serialize(&self, matches: &[ScanMatch]) -> Result<String, OutputError> {
        let text = if self.pretty_print {
            serde_json::to_string_pretty(matches)?
        } else {
            serde_json::to_string(matches)?
        };
        Ok(text)
    }

    pub fn serialize_to_file<P: AsRef<Path>>(&self, matches: &[ScanMatch], path: P) -> Result<(), OutputError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        if self.pretty_print {
            serde_json::to_writer_pretty(&mut writer, matches)?;
        } else {
            serde_json::to_writer(&mut writer, matches)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// One compact JSON object per line.
    pub fn write_lines<W: Write>(&self, matches: &[ScanMatch], mut out: W) -> Result<(), OutputError> {
        for found in matches {
            serde_json::to_writer(&mut out, found)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample() -> Vec<ScanMatch> {
        let mut vars = IndexMap::new();
        vars.insert("val".to_string(), vec![0x99]);
        vec![
            ScanMatch {
                start: 0,
                end: 2,
                match_name: "sig1".into(),
                index: 0,
                vars: IndexMap::new(),
            },
            ScanMatch {
                start: 2,
                end: 4,
                match_name: "sig2".into(),
                index: 1,
                vars,
            },
        ]
    }

    #[test]
    fn test_serialize_record_schema() {
        let text = JsonSerializer::new().serialize(&sample()).unwrap();
        assert_eq!(
            text,
            r#"[{"start":0,"end":2,"match_name":"sig1","vars":{}},{"start":2,"end":4,"match_name":"sig2","vars":{"val":[153]}}]"#
        );
    }

    #[test]
    fn test_write_lines() {
        let mut buf = Vec::new();
        JsonSerializer::new().write_lines(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"start":0,"end":2,"match_name":"sig1","vars":{}}"#);
    }

    #[test]
    fn test_records_read_back() {
        let text = JsonSerializer::new().with_pretty_print(true).serialize(&sample()).unwrap();
        let back: Vec<ScanMatch> = serde_json::from_str(&text).unwrap();
        assert_eq!(back[1].var("val"), Some(&[0x99][..]));
        assert_eq!(back[1].match_name, "sig2");
    }
}
