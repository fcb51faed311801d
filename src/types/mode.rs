//! Extraction Modes
//!
//! [`Extractor`] names the strategy that actually produced a map and is the
//! single place that dispatches between the structural parser and the lexical
//! scanners. [`MapMode`] is what a caller asks for.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Extractor Metadata Table
// =============================================================================

struct ExtractorMeta {
    /// Header label, e.g. `Python-AST`
    display_name: &'static str,
    /// Stable identifier used by config and CLI
    id: &'static str,
    /// Alternative names accepted when parsing
    aliases: &'static [&'static str],
}

macro_rules! extractor_meta {
    ($display:literal, $id:literal, [$($alias:literal),*]) => {
        ExtractorMeta {
            display_name: $display,
            id: $id,
            aliases: &[$($alias),*],
        }
    };
}

/// Strategy that produced a structure map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extractor {
    PythonAst,
    PhpLite,
    KotlinLite,
    JavaLite,
}

impl Extractor {
    pub const ALL: [Extractor; 4] = [
        Extractor::PythonAst,
        Extractor::PhpLite,
        Extractor::KotlinLite,
        Extractor::JavaLite,
    ];

    fn meta(&self) -> ExtractorMeta {
        match self {
            Extractor::PythonAst => extractor_meta!("Python-AST", "python-ast", ["python", "py", "python-ast", "ast"]),
            Extractor::PhpLite => extractor_meta!("PHP-lite", "php-lite", ["php", "php-lite"]),
            Extractor::KotlinLite => extractor_meta!("Kotlin-lite", "kotlin-lite", ["kotlin", "kt", "kotlin-lite"]),
            Extractor::JavaLite => extractor_meta!("Java-lite", "java-lite", ["java", "java-lite"]),
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.meta().display_name
    }

    pub fn as_str(&self) -> &'static str {
        self.meta().id
    }

    /// Lexical language behind a lite extractor
    pub fn lite_language(&self) -> Option<LiteLanguage> {
        match self {
            Extractor::PythonAst => None,
            Extractor::PhpLite => Some(LiteLanguage::Php),
            Extractor::KotlinLite => Some(LiteLanguage::Kotlin),
            Extractor::JavaLite => Some(LiteLanguage::Java),
        }
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Extractor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Extractor::ALL
            .into_iter()
            .find(|e| e.meta().aliases.contains(&lower.as_str()))
            .ok_or_else(|| {
                format!(
                    "Unknown extractor '{}'. Valid values: python-ast, php-lite, kotlin-lite, java-lite",
                    s
                )
            })
    }
}

// =============================================================================
// Lite Languages
// =============================================================================

/// Language handled by a lexical scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteLanguage {
    Php,
    Kotlin,
    Java,
}

impl LiteLanguage {
    pub const ALL: [LiteLanguage; 3] = [LiteLanguage::Php, LiteLanguage::Kotlin, LiteLanguage::Java];

    pub fn extractor(&self) -> Extractor {
        match self {
            LiteLanguage::Php => Extractor::PhpLite,
            LiteLanguage::Kotlin => Extractor::KotlinLite,
            LiteLanguage::Java => Extractor::JavaLite,
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            LiteLanguage::Php => &["php", "phtml"],
            LiteLanguage::Kotlin => &["kt", "kts"],
            LiteLanguage::Java => &["java"],
        }
    }

    /// Detect from a filename hint by extension (case-insensitive)
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path.trim())
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();
        LiteLanguage::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for LiteLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteLanguage::Php => write!(f, "PHP"),
            LiteLanguage::Kotlin => write!(f, "Kotlin"),
            LiteLanguage::Java => write!(f, "Java"),
        }
    }
}

// =============================================================================
// Requested Mode
// =============================================================================

/// Mode requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MapMode {
    #[default]
    Auto,
    Explicit(Extractor),
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapMode::Auto => write!(f, "auto"),
            MapMode::Explicit(extractor) => f.write_str(extractor.as_str()),
        }
    }
}

impl FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(MapMode::Auto);
        }
        s.parse::<Extractor>().map(MapMode::Explicit).map_err(|_| {
            format!(
                "Invalid mode '{}'. Valid values: auto, python-ast, php-lite, kotlin-lite, java-lite",
                s
            )
        })
    }
}

impl TryFrom<String> for MapMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MapMode> for String {
    fn from(mode: MapMode) -> Self {
        mode.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_display_names() {
        assert_eq!(Extractor::PythonAst.to_string(), "Python-AST");
        assert_eq!(Extractor::PhpLite.to_string(), "PHP-lite");
        assert_eq!(Extractor::KotlinLite.to_string(), "Kotlin-lite");
        assert_eq!(Extractor::JavaLite.to_string(), "Java-lite");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("auto".parse::<MapMode>().unwrap(), MapMode::Auto);
        assert_eq!("AUTO".parse::<MapMode>().unwrap(), MapMode::Auto);
        assert_eq!(
            "python-ast".parse::<MapMode>().unwrap(),
            MapMode::Explicit(Extractor::PythonAst)
        );
        assert_eq!(
            "kt".parse::<MapMode>().unwrap(),
            MapMode::Explicit(Extractor::KotlinLite)
        );
        assert!("cobol".parse::<MapMode>().is_err());
    }

    #[test]
    fn test_mode_display_roundtrips_through_parse() {
        for extractor in Extractor::ALL {
            let mode = MapMode::Explicit(extractor);
            assert_eq!(mode.to_string().parse::<MapMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_lite_language_from_path() {
        assert_eq!(LiteLanguage::from_path("Foo.PHP"), Some(LiteLanguage::Php));
        assert_eq!(LiteLanguage::from_path("build.gradle.kts"), Some(LiteLanguage::Kotlin));
        assert_eq!(LiteLanguage::from_path("src/Main.java"), Some(LiteLanguage::Java));
        assert_eq!(LiteLanguage::from_path("main.py"), None);
        assert_eq!(LiteLanguage::from_path(""), None);
    }

    #[test]
    fn test_lite_extractor_mapping() {
        for lang in LiteLanguage::ALL {
            assert_eq!(lang.extractor().lite_language(), Some(lang));
        }
        assert_eq!(Extractor::PythonAst.lite_language(), None);
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&MapMode::Explicit(Extractor::PhpLite)).unwrap();
        assert_eq!(json, "\"php-lite\"");
        let mode: MapMode = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(mode, MapMode::Auto);
    }
}
