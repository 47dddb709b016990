//! Style selectors and versioned JSON style definitions.
//!
//! Style definitions travel as JSON documents so other applications can
//! reuse them; only the `awv-v0` version is understood. Interpretation
//! failures are ordinary [`Validation`] failures, never panics.

use serde::{Deserialize, Serialize};

use crate::validation::{Validation, fail};

/// Fill settings. Colors are CSS color strings, opaque to the core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FillSpec {
    pub color: Option<String>,
}

/// Stroke settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokeSpec {
    pub color: Option<String>,
    pub width: Option<f64>,
    #[serde(default)]
    pub line_dash: Vec<f64>,
}

/// Point marker settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircleSpec {
    pub radius: Option<f64>,
    pub fill: Option<FillSpec>,
    pub stroke: Option<StrokeSpec>,
}

/// A declarative style description handed to the renderer as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSpec {
    pub fill: Option<FillSpec>,
    pub stroke: Option<StrokeSpec>,
    pub circle: Option<CircleSpec>,
}

/// How a layer's features are styled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleSelector {
    /// One fixed style for every feature.
    Static(StyleSpec),
}

/// Wire shape of a style definition document.
#[derive(Deserialize)]
struct StyleDefinition {
    version: String,
    style: StyleSpec,
}

/// Supported style definition version.
const STYLE_VERSION: &str = "awv-v0";

/// Interpret an encoded style definition into a [`StyleSpec`].
///
/// Only `encoding == "json"` with a `version: "awv-v0"` document is
/// supported; anything else yields a failure describing the problem.
pub fn definition_to_style(encoding: &str, definition: &str) -> Validation<StyleSpec> {
    if encoding != "json" {
        return fail(format!("Encoding '{encoding}' wordt niet ondersteund"));
    }
    let parsed: StyleDefinition = match serde_json::from_str(definition) {
        Ok(doc) => doc,
        Err(e) => return fail(format!("De stijldefinitie was geen geldige JSON: {e}")),
    };
    if parsed.version != STYLE_VERSION {
        return fail(format!("Versie '{}' wordt niet ondersteund", parsed.version));
    }
    Ok(parsed.style)
}
