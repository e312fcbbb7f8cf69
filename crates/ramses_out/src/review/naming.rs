//! Preview filename parsing
//!
//! Previews follow the `{PROJECT}_S_{SHOT}_{STEP}` convention. The shot
//! identifier may carry a sequence prefix (`SEQ01_SH010`), which is split
//! off into its own component. Parsing is pure: no filesystem access.

use super::error::ParseError;

/// Components recovered from a preview filename stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub project: String,
    pub sequence: Option<String>,
    pub shot: String,
    pub step: String,
}

/// Parse a preview filename stem into project/sequence/shot/step.
///
/// The step is the final underscore-separated token; everything between
/// the `_S_` separator and the step is the shot identifier, with any
/// embedded prefix treated as the sequence.
pub fn parse_preview_name(stem: &str) -> Result<ParsedName, ParseError> {
    let (project, rest) = stem
        .split_once("_S_")
        .ok_or_else(|| ParseError::MissingSeparator(stem.to_string()))?;

    if project.is_empty() {
        return Err(ParseError::EmptyComponent {
            name: stem.to_string(),
            component: "project",
        });
    }

    let (shot_id, step) = rest
        .rsplit_once('_')
        .ok_or_else(|| ParseError::MissingTokens(stem.to_string()))?;

    if shot_id.is_empty() {
        return Err(ParseError::EmptyComponent {
            name: stem.to_string(),
            component: "shot",
        });
    }
    if step.is_empty() {
        return Err(ParseError::EmptyComponent {
            name: stem.to_string(),
            component: "step",
        });
    }

    let (sequence, shot) = split_shot_id(shot_id);
    if shot.is_empty() || sequence.as_deref() == Some("") {
        return Err(ParseError::EmptyComponent {
            name: stem.to_string(),
            component: "shot",
        });
    }

    Ok(ParsedName {
        project: project.to_string(),
        sequence,
        shot,
        step: step.to_string(),
    })
}

/// Split an optional sequence prefix off a shot identifier.
///
/// `SEQ01_SH010` -> (Some("SEQ01"), "SH010"); `SH010` -> (None, "SH010").
pub fn split_shot_id(shot_id: &str) -> (Option<String>, String) {
    match shot_id.rsplit_once('_') {
        Some((sequence, shot)) => (Some(sequence.to_string()), shot.to_string()),
        None => (None, shot_id.to_string()),
    }
}
