use chrono::{DateTime, Utc};
use regex::Regex;

/// Quoted-field, space-separated vendor access-log grammar. Two leading
/// fields, the bracketed timestamp, six plain fields, the quoted request
/// line, six plain fields and two quoted fields. Trailing data after the
/// user-agent (such as a version id) is ignored.
const VENDOR_LOG_PATTERN: &str = concat!(
    r#"([^ ]*) ([^ ]*) \[([^\]]*)\] ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) "#,
    r#""([^"]*)" ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) ([^ ]*) "([^"]*)" "([^"]*)""#
);

/// Bracketed timestamp field, e.g. `10/Feb/2010:07:17:01 +0000`.
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One translated log line. The timestamp is normalized to UTC for sorting
/// and routing; the rendered text keeps the original timestamp field verbatim.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Outcome of translating one raw line. Malformed input is surfaced, never
/// silently dropped, so it stays visible without corrupting merged output.
#[derive(Debug)]
pub enum Translation {
    Translated(Record),
    Malformed(String),
}

pub struct RecordTranslator {
    pattern: Regex,
}

impl RecordTranslator {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(VENDOR_LOG_PATTERN).unwrap(),
        }
    }

    /// Translate one raw vendor-format line into the standard format:
    ///
    /// `<ip> - <requester> [<timestamp>] "<request>" <status> <bytes> "<referrer>" "<agent>"`
    ///
    /// A line that does not match the field grammar, carries an unparsable
    /// timestamp, or whose status field is not a number yields
    /// `Translation::Malformed` with the original line.
    pub fn translate(&self, line: &str) -> Translation {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(caps) = self.pattern.captures(line) else {
            return Translation::Malformed(line.to_string());
        };

        let field = |idx: usize| -> &str {
            let value = caps.get(idx).map_or("", |m| m.as_str());
            if value.is_empty() {
                "-"
            } else {
                value
            }
        };

        let raw_timestamp = field(3);
        let Ok(timestamp) = DateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT) else {
            return Translation::Malformed(line.to_string());
        };

        // Status must render as a number; everything else passes through opaquely.
        let Ok(status) = field(11).parse::<u32>() else {
            return Translation::Malformed(line.to_string());
        };

        let text = format!(
            "{} - {} [{}] \"{}\" {} {} \"{}\" \"{}\"",
            field(4),
            field(5),
            raw_timestamp,
            field(10),
            status,
            field(13),
            field(17),
            field(18),
        );

        Translation::Translated(Record {
            timestamp: timestamp.with_timezone(&Utc),
            text,
        })
    }
}

impl Default for RecordTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(line: &str) -> Translation {
        RecordTranslator::new().translate(line)
    }

    #[test]
    fn test_translates_valid_line() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - - REST.GET.ACL - \"GET /?acl HTTP/1.1\" 200 - 1384 - 399 - \"-\" \"Agent/1.0\" -";
        match translate(line) {
            Translation::Translated(record) => {
                assert_eq!(
                    record.text,
                    "1.2.3.4 - id [10/Feb/2010:07:17:01 +0000] \"GET /?acl HTTP/1.1\" 200 1384 \"-\" \"Agent/1.0\""
                );
                assert_eq!(record.timestamp.to_rfc3339(), "2010-02-10T07:17:01+00:00");
            }
            Translation::Malformed(_) => panic!("line should translate"),
        }
    }

    #[test]
    fn test_translated_line_shape() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - - REST.GET.ACL - \"GET /?acl HTTP/1.1\" 200 - 1384 - 399 - \"-\" \"Agent/1.0\" -";
        let Translation::Translated(record) = translate(line) else {
            panic!("line should translate");
        };
        // ip - requester [timestamp] "request" status bytes "referrer" "agent"
        let rx = Regex::new(
            r#"^([^ ]+) - ([^ ]+) \[([^\]]+)\] "([^"]*)" (\d+) ([^ ]+) "([^"]*)" "([^"]*)"$"#,
        )
        .unwrap();
        assert!(rx.is_match(&record.text), "unexpected shape: {}", record.text);
    }

    #[test]
    fn test_timestamp_offset_is_normalized() {
        let line = "b r [10/Feb/2010:09:17:01 +0200] 1.2.3.4 id - - REST.GET.ACL - \"GET / HTTP/1.1\" 200 - 10 - 1 - \"-\" \"A\" -";
        let Translation::Translated(record) = translate(line) else {
            panic!("line should translate");
        };
        assert_eq!(record.timestamp.to_rfc3339(), "2010-02-10T07:17:01+00:00");
        // the rendered text keeps the original offset verbatim
        assert!(record.text.contains("[10/Feb/2010:09:17:01 +0200]"));
    }

    #[test]
    fn test_missing_fields_yield_error_marker() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - \"GET / HTTP/1.1\" 200";
        match translate(line) {
            Translation::Malformed(original) => assert_eq!(original, line),
            Translation::Translated(_) => panic!("truncated line must not translate"),
        }
    }

    #[test]
    fn test_garbage_line_yields_error_marker() {
        assert!(matches!(translate("not a log line"), Translation::Malformed(_)));
        assert!(matches!(translate(""), Translation::Malformed(_)));
    }

    #[test]
    fn test_unparsable_timestamp_yields_error_marker() {
        let line = "b r [not a timestamp] 1.2.3.4 id - - REST.GET.ACL - \"GET / HTTP/1.1\" 200 - 10 - 1 - \"-\" \"A\" -";
        assert!(matches!(translate(line), Translation::Malformed(_)));
    }

    #[test]
    fn test_non_numeric_status_yields_error_marker() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - - REST.GET.ACL - \"GET / HTTP/1.1\" xx - 10 - 1 - \"-\" \"A\" -";
        assert!(matches!(translate(line), Translation::Malformed(_)));
    }

    #[test]
    fn test_empty_quoted_fields_render_as_dash() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - - REST.GET.ACL - \"GET / HTTP/1.1\" 200 - 10 - 1 - \"\" \"\" -";
        let Translation::Translated(record) = translate(line) else {
            panic!("line should translate");
        };
        assert!(record.text.ends_with("\"-\" \"-\""), "got: {}", record.text);
    }

    #[test]
    fn test_trailing_newline_is_stripped() {
        let line = "b r [10/Feb/2010:07:17:01 +0000] 1.2.3.4 id - - REST.GET.ACL - \"GET /?acl HTTP/1.1\" 200 - 1384 - 399 - \"-\" \"Agent/1.0\" -\n";
        assert!(matches!(translate(line), Translation::Translated(_)));
    }
}
