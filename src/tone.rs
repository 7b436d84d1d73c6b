//! Tone-adaptive rendering of system messages
//!
//! Each tone owns a small table of whole-word substitutions. Rules are
//! applied once, in table order, to every system-authored message.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Voice the widget speaks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
}

impl Tone {
    /// Substitution rules as `(pattern, replacement)` pairs
    pub fn rules(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Tone::Professional => &[
                ("Hey", "Hello"),
                ("Hi there", "Hello"),
                ("Thanks", "Thank you"),
                ("Sure", "Certainly"),
            ],
            Tone::Friendly => &[
                ("Hello", "Hi there"),
                ("Thank you", "Thanks"),
                ("Certainly", "Sure"),
            ],
            Tone::Casual => &[
                ("Hello", "Hey"),
                ("Thank you", "Thanks"),
                ("Certainly", "Sure"),
            ],
        }
    }
}

struct CompiledRule {
    pattern: Regex,
    replacement: &'static str,
}

fn compile_rule(pattern: &str, replacement: &'static str) -> Result<CompiledRule, regex::Error> {
    Ok(CompiledRule {
        pattern: Regex::new(&format!(r"\b{}\b", regex::escape(pattern)))?,
        replacement,
    })
}

fn compile(tone: Tone) -> Vec<CompiledRule> {
    let mut rules = Vec::with_capacity(tone.rules().len());
    for &(pattern, replacement) in tone.rules() {
        match compile_rule(pattern, replacement) {
            Ok(rule) => rules.push(rule),
            Err(e) => tracing::error!(
                tone = ?tone,
                pattern,
                error = %e,
                "Tone rule failed to compile, skipping"
            ),
        }
    }
    rules
}

static PROFESSIONAL: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(Tone::Professional));
static FRIENDLY: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(Tone::Friendly));
static CASUAL: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(Tone::Casual));

fn compiled(tone: Tone) -> &'static [CompiledRule] {
    match tone {
        Tone::Professional => &PROFESSIONAL,
        Tone::Friendly => &FRIENDLY,
        Tone::Casual => &CASUAL,
    }
}

/// Rewrite a system message in the given tone.
pub fn format_by_tone(message: &str, tone: Tone) -> String {
    let mut out = message.to_string();
    for rule in compiled(tone) {
        if rule.pattern.is_match(&out) {
            out = rule
                .pattern
                .replace_all(&out, rule.replacement)
                .into_owned();
        }
    }
    out
}
