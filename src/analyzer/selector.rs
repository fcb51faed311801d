//! Mode Selector
//!
//! Chooses the extractor for one source text:
//!
//! ```text
//! NotStarted -> TryingStructural -> Done
//!                      |
//!                      +-> Fallback(lang) -> Done      (Auto only)
//! NotStarted -> Fallback(lang) -> Done                 (explicit lite mode)
//! ```
//!
//! An explicit `python-ast` request never falls back; its parse error is
//! returned to the caller.

use super::parser::create_parser;
use super::scanner::{scan, sniff_language};
use crate::types::{Declaration, Extractor, LiteLanguage, MapMode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    NotStarted,
    TryingStructural,
    Fallback(LiteLanguage),
    Done(Extractor),
}

/// Extractor that produced the declarations, and the declarations
#[derive(Debug, Clone)]
pub struct Selection {
    pub mode_used: Extractor,
    pub declarations: Vec<Declaration>,
}

pub struct ModeSelector<'a> {
    filename: Option<&'a str>,
    state: SelectorState,
}

impl<'a> ModeSelector<'a> {
    /// `filename` is only a sniffing hint for the fallback
    pub fn new(filename: Option<&'a str>) -> Self {
        Self {
            filename,
            state: SelectorState::NotStarted,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    fn transition(&mut self, next: SelectorState) {
        tracing::debug!("Mode selector: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn run(&mut self, source: &str, mode: MapMode) -> Result<Selection> {
        match mode {
            MapMode::Explicit(extractor) => match extractor.lite_language() {
                Some(language) => Ok(self.lite(source, language)),
                None => self.structural(source, extractor),
            },
            MapMode::Auto => match self.structural(source, Extractor::PythonAst) {
                Err(e) if e.should_fallback() => {
                    tracing::debug!("Structural extraction failed, falling back: {}", e);
                    let language = sniff_language(source, self.filename);
                    Ok(self.lite(source, language))
                }
                other => other,
            },
        }
    }

    fn structural(&mut self, source: &str, extractor: Extractor) -> Result<Selection> {
        self.transition(SelectorState::TryingStructural);
        let declarations = create_parser(extractor)?.parse(source)?;
        Ok(self.finish(extractor, declarations))
    }

    fn lite(&mut self, source: &str, language: LiteLanguage) -> Selection {
        self.transition(SelectorState::Fallback(language));
        let declarations = scan(source, language);
        self.finish(language.extractor(), declarations)
    }

    fn finish(&mut self, mode_used: Extractor, declarations: Vec<Declaration>) -> Selection {
        self.transition(SelectorState::Done(mode_used));
        Selection {
            mode_used,
            declarations,
        }
    }
}

/// Run a fresh selector over `source`
pub fn select(source: &str, mode: MapMode, filename: Option<&str>) -> Result<Selection> {
    ModeSelector::new(filename).run(source, mode)
}
