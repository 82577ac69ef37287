//! Whole-pipeline properties of the classifier.

use aipa_render::{
    classify, classify_and_render, normalize_inline_math, reconstruct, Segment, SegmentKind,
};

const SAMPLES: &[&str] = &[
    "",
    "\n\n",
    "Just one line of prose.",
    "Hello\n",
    "Intro text.\n\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\nOutro text.",
    "import os\n\ndef main():\n    print(os.name)\n\nThat prints the OS name.\n",
    "Query:\nSELECT id, name\nFROM users\n\nWHERE id = 1;\n\n$$\na^2 + b^2 = c^2\n$$\nAfter.",
    "<html>\n<body>\n<p>Hi</p>\n</body>\n</html>\n.card {\n  color: red;\n}\n",
    "  [ x^2 + y^2 ]  \nwhere \\( x \\) is real and $y$ too\n\\frac{1}{2}\nplain",
    "```\n\n```\n```\n",
    "Look:\n```python\nx = 1\n\nprint(x)",
    "total = 1\n\\[\nunclosed math\n\n",
    "a { color: blue; }\n\n\n<div>never closed\n",
];

fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
    segments.iter().map(|s| s.kind).collect()
}

#[test]
fn reconstruction_matches_normalized_input() {
    for sample in SAMPLES {
        let normalized = normalize_inline_math(sample);
        let segments = classify(sample);
        assert_eq!(
            reconstruct(&segments, line_count(&normalized)),
            normalized,
            "sample {:?}",
            sample
        );
    }
}

#[test]
fn reconstruction_keeps_normalized_inline_math() {
    let text = "Let \\( x \\) be real.\n\n```\ny = 1\n```";
    let segments = classify(text);

    assert_eq!(
        reconstruct(&segments, line_count(text)),
        "Let $x$ be real.\n\n```\ny = 1\n```"
    );
}

#[test]
fn reconstruction_is_exact_without_paren_math() {
    let text = "Some $y$ math.\nSELECT 1\n\n[ a + b ]\nafter";
    let segments = classify(text);
    assert_eq!(reconstruct(&segments, line_count(text)), text);
}

#[test]
fn segments_are_ordered_and_disjoint() {
    for sample in SAMPLES {
        let segments = classify(sample);
        for pair in segments.windows(2) {
            assert!(
                pair[0].lines.end <= pair[1].lines.start,
                "overlap in {:?}: {:?}",
                sample,
                pair
            );
        }
        for segment in &segments {
            assert!(!segment.lines.is_empty(), "empty range in {:?}", sample);
            if segment.kind == SegmentKind::Prose {
                assert!(!segment.content.trim().is_empty());
            }
        }
    }
}

#[test]
fn buffered_kinds_never_repeat_back_to_back() {
    let grouped = [
        SegmentKind::Prose,
        SegmentKind::InlineMath,
        SegmentKind::InferredCode,
        SegmentKind::Sql,
    ];

    for sample in SAMPLES {
        let segments = classify(sample);
        for pair in segments.windows(2) {
            let touching = pair[0].lines.end == pair[1].lines.start;
            assert!(
                !(touching && pair[0].kind == pair[1].kind && grouped.contains(&pair[0].kind)),
                "split run in {:?}: {:?}",
                sample,
                pair
            );
        }
    }
}

#[test]
fn unterminated_fence_runs_to_end_of_input() {
    let text = "Here you go:\n```js\nconst a = 1;\n\nSELECT nothing\n$$";
    let segments = classify(text);

    assert_eq!(kinds(&segments), vec![SegmentKind::Prose, SegmentKind::FencedCode]);
    assert_eq!(segments[1].content, "const a = 1;\n\nSELECT nothing\n$$");
    assert_eq!(segments[1].lines, 1..6);
    assert_eq!(segments[1].language.as_deref(), Some("js"));
}

#[test]
fn sql_blocks_carry_dialect_tags() {
    let cases = [
        ("SELECT * FROM DUAL", "oracle-sql"),
        ("SELECT id FROM t LIMIT 5", "mysql"),
        ("SELECT * FROM t RETURNING id", "postgresql"),
        ("SELECT 1", "sql"),
    ];

    for (text, tag) in cases {
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::Sql], "{}", text);
        assert_eq!(segments[0].language.as_deref(), Some(tag), "{}", text);
    }
}

#[test]
fn prose_output_reclassifies_to_one_segment() {
    let text = "First paragraph of the answer.\n\nSecond paragraph, still prose.";

    let mut prose = Vec::new();
    classify_and_render(text, &mut |s: &Segment| {
        assert_eq!(s.kind, SegmentKind::Prose);
        prose.push(s.content.clone());
    });

    let joined = prose.join("\n");
    let again = classify(&joined);
    assert_eq!(kinds(&again), vec![SegmentKind::Prose]);
    assert_eq!(again[0].content, joined);
}

#[test]
fn every_nonblank_line_reaches_the_renderer() {
    for sample in SAMPLES {
        let mut rendered = String::new();
        classify_and_render(sample, &mut |s: &Segment| {
            rendered.push_str(&s.source_text());
            rendered.push('\n');
        });

        let normalized = normalize_inline_math(sample);
        for line in normalized.lines().filter(|l| !l.trim().is_empty()) {
            assert!(
                rendered.contains(line),
                "line {:?} of {:?} was dropped",
                line,
                sample
            );
        }
    }
}
