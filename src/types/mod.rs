pub mod declaration;
pub mod error;
pub mod mode;

pub use declaration::{Declaration, DeclarationKind, Modifier, Outline, nesting_depth};
pub use error::{MapError, Result};
pub use mode::{Extractor, LiteLanguage, MapMode};

// =============================================================================
// Map Result
// =============================================================================

use serde::Serialize;

/// Final output of one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct MapResult {
    pub mode_used: Extractor,
    pub declarations: Vec<Declaration>,
    /// TODO/FIXME/HACK/TEMP markers, kind [`DeclarationKind::TodoMarker`]
    pub warnings: Vec<Declaration>,
    pub rendered_text: String,
}
