//! Per-line trigger patterns.
//!
//! Every line is reduced once to a [`LineFeatures`] value; the classifier's
//! transition table only ever looks at these features.

use regex::Regex;
use std::sync::LazyLock;

static CODE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(def\s+\w+\s*\(|class\s+\w+|import\s+\w+|from\s+\w+|if\s+.+:|for\s+.+:|while\s+.+:|try:|except\s+.+:|with\s+.+:|\w+\s*=\s*.+)",
    )
    .unwrap()
});

static HTML_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<(!DOCTYPE|html|head|body|div|span|p|a|ul|ol|li|script|style|!--)")
        .unwrap()
});

static CSS_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*[.#]?\w[\w\-]*\s*\{|^\s*@[a-z\-]+\s+[^{]*\{").unwrap()
});

// The trailing semicolon is mandatory so that "Answer: yes" stays prose.
static CSS_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\w\-]+\s*:\s*[^;]+;\s*$").unwrap());

static RAW_LATEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(frac|sqrt|exp|sum|int|mu|sigma|left|right|alpha|beta|pi|text)").unwrap()
});

static INLINE_MATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([^$]+)\$").unwrap());

const SQL_START_KEYWORDS: [&str; 5] = ["SELECT", "INSERT", "UPDATE", "DELETE", "WITH"];

const CODE_CONTINUATION_PREFIXES: [&str; 10] = [
    "#", "else:", "elif", "except", "finally", "return", "yield", ")", "]", "}",
];

/// How a single line of display math is delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DisplayTrigger<'a> {
    /// Formula and both delimiters on one line.
    SingleLine {
        open: &'a str,
        content: &'a str,
        close: &'a str,
    },

    /// A lone opening delimiter; the block ends at a lone `close` line.
    Open { close: &'static str },
}

/// What a line would start if no mode were active, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineClass<'a> {
    Display(DisplayTrigger<'a>),
    RawFormula,
    Fence { tag: Option<&'a str> },
    CodeStart,
    SqlStart,
    HtmlStart,
    CssStart,
    InlineMath,
    Prose,
}

/// Features of one source line.
#[derive(Debug, Clone)]
pub(crate) struct LineFeatures<'a> {
    pub class: LineClass<'a>,

    /// The line is empty or whitespace only.
    pub blank: bool,

    /// The trimmed line opens or closes a code fence.
    pub fence: bool,

    /// Continues an open block of inferred code.
    pub code_continuation: bool,

    /// Ends an open HTML block.
    pub html_end: bool,

    /// Ends an open CSS block.
    pub css_end: bool,

    /// The trimmed line, for closing-delimiter comparisons.
    pub stripped: &'a str,

    line: &'a str,
}

impl<'a> LineFeatures<'a> {
    pub fn of(line: &'a str) -> Self {
        let stripped = line.trim();
        let blank = stripped.is_empty();
        let fence = stripped.starts_with("```");
        let lower = stripped.to_lowercase();

        let class = if let Some(trigger) = display_trigger(line, stripped) {
            LineClass::Display(trigger)
        } else if !blank && RAW_LATEX.is_match(stripped) {
            LineClass::RawFormula
        } else if fence {
            let tag = stripped[3..].trim();
            LineClass::Fence {
                tag: (!tag.is_empty()).then_some(tag),
            }
        } else if CODE_START.is_match(line) {
            LineClass::CodeStart
        } else {
            non_code_class(line, stripped)
        };

        Self {
            class,
            blank,
            fence,
            code_continuation: is_code_continuation(line, stripped),
            html_end: lower.ends_with("</html>") || lower.ends_with("</body>"),
            css_end: line.contains('}'),
            stripped,
            line,
        }
    }

    /// The features of a line that just ended a block of inferred code. It is
    /// read again without the code-start patterns.
    pub fn after_code(&self) -> Self {
        let mut features = self.clone();
        if features.class == LineClass::CodeStart {
            features.class = non_code_class(self.line, self.stripped);
        }
        features
    }

    /// Lines that interrupt any buffering mode.
    pub fn forces_flush(&self) -> bool {
        self.fence || matches!(self.class, LineClass::Display(_))
    }
}

fn non_code_class<'a>(line: &'a str, stripped: &'a str) -> LineClass<'a> {
    if starts_with_sql_keyword(stripped) {
        LineClass::SqlStart
    } else if HTML_START.is_match(line) {
        LineClass::HtmlStart
    } else if CSS_START.is_match(line) || CSS_PROPERTY.is_match(line) {
        LineClass::CssStart
    } else if INLINE_MATH.is_match(line) {
        LineClass::InlineMath
    } else {
        LineClass::Prose
    }
}

fn starts_with_sql_keyword(stripped: &str) -> bool {
    let upper = stripped.to_uppercase();
    SQL_START_KEYWORDS.iter().any(|kw| upper.starts_with(kw))
}

fn is_code_continuation(line: &str, stripped: &str) -> bool {
    !stripped.is_empty()
        && (CODE_CONTINUATION_PREFIXES
            .iter()
            .any(|prefix| stripped.starts_with(prefix))
            || line.starts_with("    ")
            || line.starts_with('\t'))
}

fn display_trigger<'a>(line: &'a str, stripped: &'a str) -> Option<DisplayTrigger<'a>> {
    match stripped {
        "$$" => return Some(DisplayTrigger::Open { close: "$$" }),
        "[" => return Some(DisplayTrigger::Open { close: "]" }),
        "\\[" => return Some(DisplayTrigger::Open { close: "\\]" }),
        _ => {}
    }

    let lead = line.len() - line.trim_start().len();
    let tail = line.trim_end().len();

    // Longer delimiters first so `\[` is not read as `[`.
    for (open, close) in [("\\[", "\\]"), ("$$", "$$"), ("[", "]")] {
        let min_len = open.len() + close.len();
        if stripped.len() > min_len && stripped.starts_with(open) && stripped.ends_with(close) {
            let content_start = lead + open.len();
            let content_end = tail - close.len();
            return Some(DisplayTrigger::SingleLine {
                open: &line[..content_start],
                content: &line[content_start..content_end],
                close: &line[content_end..],
            });
        }
    }

    None
}
