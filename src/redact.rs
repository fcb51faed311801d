//! Sensitive Data Redaction
//!
//! Masks personal data and secret literals before any extraction runs.
//! Every pattern is confined to a single line, so the line count of the input
//! is always preserved. Replacement tokens are identifier-shaped and never
//! break the syntax of the surrounding code.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ============================================================================
// Lazy-compiled Patterns
// ============================================================================

mod patterns {
    use super::*;

    /// Regional resident registration number, `NNNNNN-NNNNNNN`
    pub static NATIONAL_ID: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b\d{6}-\d{7}\b").expect("national id regex"));

    /// Regional mobile number, `01X-NNN(N)-NNNN` with optional dashes
    pub static PHONE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b01[016789]-?\d{3,4}-?\d{4}\b").expect("phone regex"));

    pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("email regex")
    });

    /// Secret-looking assignment: declaration keywords, optional type,
    /// a name containing a secret marker, optional annotation, `=` or `:=`,
    /// then a quoted literal. One-line triple-quoted literals are tried first.
    pub static SECRET_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"(?im)^(?P<head>[ \t]*(?:(?:export|const|let|var|val|final|static|private|public|protected|readonly)[ \t]+)*(?:[A-Z_][\w.<>\[\]?]*[ \t]+)?\$?[A-Z0-9_]*(?:TOKEN|API[_-]?KEY|SECRET|PASSWORD|PASS|AUTH|BEARER)[A-Z0-9_]*(?:[ \t]*:[ \t]*[A-Z_][\w.<>\[\]?]*)?[ \t]*:?=[ \t]*)(?:"""(?P<tdq>[^\r\n]*?)"""|'''(?P<tsq>[^\r\n]*?)'''|"(?P<dq>(?:[^"\\\r\n]|\\.)*)"|'(?P<sq>(?:[^'\\\r\n]|\\.)*)')"#,
        )
        .expect("secret assignment regex")
    });
}

/// Category of sensitive data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionCategory {
    Email,
    Phone,
    NationalId,
    Secret,
}

impl RedactionCategory {
    /// Application order: secrets first so their literals are masked whole
    pub const ALL: [RedactionCategory; 4] = [
        RedactionCategory::Secret,
        RedactionCategory::NationalId,
        RedactionCategory::Phone,
        RedactionCategory::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::NationalId => "national_id",
            Self::Secret => "secret",
        }
    }

    pub fn replacement(&self) -> &'static str {
        match self {
            Self::Email => "REDACTED_EMAIL",
            Self::Phone => "REDACTED_PHONE",
            Self::NationalId => "REDACTED_ID",
            Self::Secret => "REDACTED_SECRET",
        }
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Self::Email => patterns::EMAIL.replace_all(text, self.replacement()).into_owned(),
            Self::Phone => patterns::PHONE.replace_all(text, self.replacement()).into_owned(),
            Self::NationalId => patterns::NATIONAL_ID
                .replace_all(text, self.replacement())
                .into_owned(),
            Self::Secret => patterns::SECRET_ASSIGN
                .replace_all(text, |caps: &Captures| {
                    let quote = if caps.name("tdq").is_some() {
                        "\"\"\""
                    } else if caps.name("tsq").is_some() {
                        "'''"
                    } else if caps.name("dq").is_some() {
                        "\""
                    } else {
                        "'"
                    };

                    // A multi-line triple-quote opener reads as an empty literal
                    // followed by a third quote; leave it untouched.
                    let end = caps.get(0).map_or(text.len(), |m| m.end());
                    if quote.len() == 1 && text[end..].starts_with(quote) {
                        return caps[0].to_string();
                    }

                    format!("{}{quote}{}{quote}", &caps["head"], self.replacement())
                })
                .into_owned(),
        }
    }
}

impl fmt::Display for RedactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedactionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "national_id" | "ssn" | "id" => Ok(Self::NationalId),
            "secret" | "secrets" => Ok(Self::Secret),
            _ => Err(format!(
                "Unknown redaction category '{}'. Valid values: email, phone, national_id, secret",
                s
            )),
        }
    }
}

/// Mask every enabled category in `text`.
///
/// Pure and total; the output has exactly as many lines as the input.
pub fn redact(text: &str, categories: &[RedactionCategory]) -> String {
    let mut out = text.to_string();
    for category in RedactionCategory::ALL {
        if categories.contains(&category) {
            out = category.apply(&out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_redact_email_phone_id() {
        let text = "# contact: dev@example.com, 010-1234-5678, 900101-1234567";
        let out = redact(text, &RedactionCategory::ALL);
        assert_eq!(out, "# contact: REDACTED_EMAIL, REDACTED_PHONE, REDACTED_ID");
    }

    #[test]
    fn test_redact_secret_keeps_quote_style() {
        let text = "API_KEY = 'sk-live-123'\nDB_PASSWORD=\"hunter2\"\nname = 'x'";
        let out = redact(text, &[RedactionCategory::Secret]);
        assert_eq!(
            out,
            "API_KEY = 'REDACTED_SECRET'\nDB_PASSWORD=\"REDACTED_SECRET\"\nname = 'x'"
        );
    }

    #[test]
    fn test_redact_secret_with_declaration_keywords() {
        let java = "    private static final String API_KEY = \"abc\";";
        assert_eq!(
            redact(java, &[RedactionCategory::Secret]),
            "    private static final String API_KEY = \"REDACTED_SECRET\";"
        );

        let kotlin = "val authToken: String = \"t0k\"";
        assert_eq!(
            redact(kotlin, &[RedactionCategory::Secret]),
            "val authToken: String = \"REDACTED_SECRET\""
        );

        let php = "$secretKey = 'abc\\'def';";
        assert_eq!(
            redact(php, &[RedactionCategory::Secret]),
            "$secretKey = 'REDACTED_SECRET';"
        );
    }

    #[test]
    fn test_redact_secret_triple_quoted() {
        let python = "API_TOKEN = '''abc'''\nDB_PASSWORD = \"\"\"hunter2\"\"\"";
        assert_eq!(
            redact(python, &[RedactionCategory::Secret]),
            "API_TOKEN = '''REDACTED_SECRET'''\nDB_PASSWORD = \"\"\"REDACTED_SECRET\"\"\""
        );

        let kotlin = "    val apiToken = \"\"\"raw\"\"\"";
        assert_eq!(
            redact(kotlin, &[RedactionCategory::Secret]),
            "    val apiToken = \"\"\"REDACTED_SECRET\"\"\""
        );
    }

    #[test]
    fn test_redact_secret_leaves_multiline_literal_intact() {
        let text = "PASSWORD = \"\"\"\nhunter2\n\"\"\"\nTOKEN = '''\nabc\n'''\n";
        assert_eq!(redact(text, &[RedactionCategory::Secret]), text);
    }

    #[test]
    fn test_redact_secret_empty_literal() {
        let text = "PASSWORD = \"\"\nTOKEN = ''";
        assert_eq!(
            redact(text, &[RedactionCategory::Secret]),
            "PASSWORD = \"REDACTED_SECRET\"\nTOKEN = 'REDACTED_SECRET'"
        );
    }

    #[test]
    fn test_redact_secret_ignores_non_literal_values() {
        let text = "token = os.environ['TOKEN']";
        assert_eq!(redact(text, &[RedactionCategory::Secret]), text);
    }

    #[test]
    fn test_redact_respects_categories() {
        let text = "mail = 'a@b.io'  # 010-1234-5678";
        let out = redact(text, &[RedactionCategory::Phone]);
        assert_eq!(out, "mail = 'a@b.io'  # REDACTED_PHONE");
        assert_eq!(redact(text, &[]), text);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("national-id".parse::<RedactionCategory>().unwrap(), RedactionCategory::NationalId);
        assert_eq!("SECRET".parse::<RedactionCategory>().unwrap(), RedactionCategory::Secret);
        assert!("address".parse::<RedactionCategory>().is_err());
    }

    proptest! {
        #[test]
        fn prop_redaction_preserves_line_count(text in "(?s).{0,400}") {
            let out = redact(&text, &RedactionCategory::ALL);
            prop_assert_eq!(out.matches('\n').count(), text.matches('\n').count());
        }
    }
}
