//! Score token extraction
//!
//! The rubric prompts ask the LLM to open its answer with `Pontuação: <n>`.
//! `Score: <n>` is accepted as well. The match is case-insensitive, must start
//! a word, may sit anywhere in the text and tolerates markdown emphasis around
//! the token (`**Pontuação:** 0.8`). A decimal comma is read as a decimal point.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const PREVIEW_CHARS: usize = 80;

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:pontua(?:ção|cao)|score)[\s*]*:[\s*]*(\d+(?:[.,]\d+)?)")
        .expect("score pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreParseError {
    #[error("no score token found in response: {preview:?}")]
    NotFound { preview: String },

    #[error("score {raw:?} is not a finite number")]
    NotFinite { raw: String },
}

/// Parse the first score token in `content`
///
/// # Examples
///
/// ```
/// use essay_grader::evaluation::score::extract_score;
///
/// assert_eq!(extract_score("Score: 0.73 bem escrito").unwrap(), 0.73);
/// assert_eq!(extract_score("Pontuação: 0,8").unwrap(), 0.8);
/// assert!(extract_score("Sem nota").is_err());
/// ```
pub fn extract_score(content: &str) -> Result<f64, ScoreParseError> {
    let raw = SCORE_PATTERN
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ScoreParseError::NotFound {
            preview: preview(content),
        })?;

    let value: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| ScoreParseError::NotFinite {
            raw: raw.to_string(),
        })?;

    if !value.is_finite() {
        return Err(ScoreParseError::NotFinite {
            raw: raw.to_string(),
        });
    }

    Ok(value)
}

fn preview(content: &str) -> String {
    let mut out: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}
