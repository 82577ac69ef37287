//! Built-in prompt templates.
//!
//! Questions and user-supplied text are wrapped in `'''` so the model can
//! tell them apart from the instructions around them.

use crate::types::PromptDefinition;

pub const CHAT_QUESTION: &str = "chat.question";
pub const CHAT_TEXT_CONTEXT: &str = "chat.text_context";
pub const CHAT_DOCUMENT_CONTEXT: &str = "chat.document_context";
pub const TUTOR_EXPLAIN_WORD: &str = "tutor.explain_word";
pub const TUTOR_QUESTION_BANK: &str = "tutor.question_bank";
pub const TUTOR_SENTENCE_REVIEW: &str = "tutor.sentence_review";
pub const TUTOR_WRITING_REVIEW: &str = "tutor.writing_review";

pub const BUILTIN_IDS: [&str; 7] = [
    CHAT_QUESTION,
    CHAT_TEXT_CONTEXT,
    CHAT_DOCUMENT_CONTEXT,
    TUTOR_EXPLAIN_WORD,
    TUTOR_QUESTION_BANK,
    TUTOR_SENTENCE_REVIEW,
    TUTOR_WRITING_REVIEW,
];

const QUESTION: &str = "Answer the following question.

'''{{question}}'''";

const TEXT_CONTEXT: &str = "Answer the following question using the provided context.

Question:
'''{{question}}'''

Context:
'''{{context}}'''";

const DOCUMENT_CONTEXT: &str = "Answer the following question using the provided PDF context.

Question:
'''{{question}}'''

Context:
'''{{context}}'''";

const EXPLAIN_WORD: &str = r#"You are teaching an 8-year-old Chinese child the English word "{{word}}".
Follow these steps:

1. **Meaning 意思**
- Explain the meaning of "{{word}}" in simple English (for a child).
- Give the meaning in Chinese.

2. **Word Forms 形式**
- If it is a noun: give singular and plural forms, with Chinese translations for each.
- If it is a verb: give base form, past simple, past participle, present participle, and third-person singular present, each with a Chinese translation.
- If it is an adjective/adverb: give common variations (comparative, superlative, etc.) with Chinese translations.

3. **Example Sentences 例句**
- For each form, give one short, clear English sentence.
- Provide the Chinese translation for each sentence.
- Keep sentences age-appropriate and easy to understand.

Use a friendly and encouraging tone suitable for children."#;

const QUESTION_BANK: &str = r#"You are an AI English teacher. The student learned this explanation:

EXPLANATION:
{{explanation}}

Create exactly {{count}} questions to help the student consolidate understanding of the word "{{word}}".
Rules:
- Base EVERYTHING ONLY on the explanation above.
- Difficulty should increase from Q1 (very easy) to Q{{count}} (hard).
- Mix of types: use "multiple_choice", "fill_blank", and "short_answer".
  * Include at least 3 different types across the {{count}} questions.
  * Avoid using the same type more than twice in a row.
- Keep language simple for an 8-year-old Chinese student.
- For multiple choice, include 3-4 options; make the correct answer clear and the "answer" MUST be exactly one of the choices.
- For all answers, ALWAYS return a string (even if the answer is a number).
- Return STRICT JSON ONLY, no prose, as:
[
  {
    "id": 1,
    "difficulty": 1,
    "type": "multiple_choice" | "fill_blank" | "short_answer",
    "question": "string",
    "choices": ["string", "string", "string"],
    "answer": "string"
  }
]
Omit "choices" for questions that are not multiple choice."#;

const SENTENCE_REVIEW: &str = r#"你是一位英语老师。学生刚学了单词 "{{word}}"。
学生写的句子是： "{{sentence}}"

请用中文给学生解释：
1. 句子是否正确、是否使用了目标单词。
2. 如果有语法错误或不自然的地方，请指出。
3. 给出一个修改后的正确版本。

格式：
- 中文点评
- 修改后的英文句子"#;

const WRITING_REVIEW: &str = r#"你是一位温柔、有耐心的英语老师，要帮助一位9岁的中国孩子学习英语写作。
学生写了一段话或多个句子：
"{{text}}"

请用中文一步一步鼓励并讲解：
1. 称赞学生的努力，鼓励他/她继续尝试。
2. 逐句解释：每个句子的意思。如果句子较长，请拆成短句再解释。并解释它们是如何组合成长句的。
3. 检查单词使用是否正确。
4. 指出所用语法，并说明是否正确。
5. 如果有错误或不自然的地方，请温柔地指出，并给出改进建议。
6. 最后提供一个改进后的完整版本。

格式要求：
- 话语必须积极鼓励。
- 用中文点评（要简单、温和，适合9岁孩子）。"#;

/// Look up a built-in prompt definition.
pub fn builtin(id: &str) -> Option<PromptDefinition> {
    let (title, template) = match id {
        CHAT_QUESTION => ("Question", QUESTION),
        CHAT_TEXT_CONTEXT => ("Question with context", TEXT_CONTEXT),
        CHAT_DOCUMENT_CONTEXT => ("Question with document context", DOCUMENT_CONTEXT),
        TUTOR_EXPLAIN_WORD => ("Explain a word", EXPLAIN_WORD),
        TUTOR_QUESTION_BANK => ("Build a question bank", QUESTION_BANK),
        TUTOR_SENTENCE_REVIEW => ("Review a sentence", SENTENCE_REVIEW),
        TUTOR_WRITING_REVIEW => ("Review writing", WRITING_REVIEW),
        _ => return None,
    };

    Some(PromptDefinition::new(id, title, template))
}
