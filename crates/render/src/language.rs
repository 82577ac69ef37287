//! Best-effort language guessing for code blocks.
//!
//! SQL is recognized first, by dialect keywords. Everything else goes through
//! the tree-sitter grammars: the buffer is parsed with each candidate grammar
//! and the first one that accepts it without syntax errors wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tree_sitter::{Language, Parser, Tree};

/// SQL dialect detected from vendor-specific keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlDialect {
    Oracle,
    MySql,
    Postgres,
    Generic,
}

impl SqlDialect {
    /// Language tag handed to renderers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle-sql",
            Self::MySql => "mysql",
            Self::Postgres => "postgresql",
            Self::Generic => "sql",
        }
    }
}

const ORACLE_KEYWORDS: [&str; 5] = ["DUAL", "NVL", "TO_DATE", "SYSDATE", "ROWNUM"];
const MYSQL_KEYWORDS: [&str; 6] = [
    "AUTO_INCREMENT",
    "ENGINE=",
    "UNSIGNED",
    "CHARSET",
    "COLLATE",
    "LIMIT",
];
const POSTGRES_KEYWORDS: [&str; 8] = [
    "SERIAL",
    "BIGSERIAL",
    "RETURNING",
    "ILIKE",
    "SIMILAR TO",
    "ARRAY",
    "JSONB",
    "::",
];

static SELECT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").unwrap());

static ORACLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| word_patterns(&ORACLE_KEYWORDS));
static MYSQL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| word_patterns(&MYSQL_KEYWORDS));

fn word_patterns(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|kw| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw))).unwrap())
        .collect()
}

/// Detect the SQL dialect of a buffer.
///
/// Only text containing the word `SELECT` is considered SQL here; vendor
/// keywords are checked Oracle first, then MySQL, then Postgres.
pub fn detect_sql_dialect(text: &str) -> Option<SqlDialect> {
    if !SELECT_WORD.is_match(text) {
        return None;
    }

    if ORACLE_PATTERNS.iter().any(|re| re.is_match(text)) {
        return Some(SqlDialect::Oracle);
    }

    if MYSQL_PATTERNS.iter().any(|re| re.is_match(text)) {
        return Some(SqlDialect::MySql);
    }

    let upper = text.to_uppercase();
    if POSTGRES_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        return Some(SqlDialect::Postgres);
    }

    Some(SqlDialect::Generic)
}

/// Grammars tried in order; JavaScript precedes TypeScript because every
/// JavaScript program also parses as TypeScript.
const GRAMMAR_ORDER: [&str; 5] = ["python", "rust", "go", "javascript", "typescript"];

fn grammar(alias: &str) -> Option<Language> {
    match alias {
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        "javascript" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        _ => None,
    }
}

/// Guess the language of a code buffer.
///
/// Returns a language alias such as `"python"` or `"mysql"`, or `None` when
/// no guess is confident. Never fails: parser problems count as "no guess".
pub fn guess_language(buffer: &str) -> Option<String> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dialect) = detect_sql_dialect(trimmed) {
        return Some(dialect.tag().to_string());
    }

    if let Some(alias) = guess_from_markers(trimmed) {
        return Some(alias.to_string());
    }

    let guess = GRAMMAR_ORDER
        .iter()
        .find(|alias| parses_cleanly(alias, buffer))
        .map(|alias| alias.to_string());

    tracing::trace!(?guess, bytes = buffer.len(), "Guessed code language");
    guess
}

/// Cheap checks for formats without a grammar here.
fn guess_from_markers(trimmed: &str) -> Option<&'static str> {
    let first_line = trimmed.lines().next().unwrap_or_default();

    if first_line.starts_with("#!") {
        if first_line.contains("python") {
            return Some("python");
        }
        if first_line.contains("node") {
            return Some("javascript");
        }
        if ["sh", "bash", "zsh"]
            .iter()
            .any(|shell| first_line.ends_with(shell))
        {
            return Some("bash");
        }
    }

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some("json");
    }

    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") {
        return Some("html");
    }

    None
}

fn parses_cleanly(alias: &str, buffer: &str) -> bool {
    let Some(language) = grammar(alias) else {
        return false;
    };

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        tracing::debug!("Failed to load {} grammar: {}", alias, e);
        return false;
    }

    match parser.parse(buffer, None) {
        Some(tree) => tree.root_node().named_child_count() > 0 && syntax_errors(&tree) == 0,
        None => false,
    }
}

/// Count ERROR and MISSING nodes in a parse tree.
fn syntax_errors(tree: &Tree) -> usize {
    let mut cursor = tree.walk();
    let mut errors = 0;

    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            errors += 1;
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return errors;
            }
        }
    }
}
