//! Built-in templates.
//!
//! The router's vectorstore topics match the sample corpus indexed by
//! `arag knowledge learn` (LLM agents, prompt engineering, adversarial
//! attacks on LLMs). Override `router` when indexing anything else.

pub const ROUTER_SYSTEM: &str = "\
You are an expert at routing a user question to a vectorstore or web search.

The vectorstore contains documents related to agents, prompt engineering, and adversarial attacks.

Use the vectorstore for questions on these topics. For all else, and especially for current events, use web-search.

Return JSON with single key, datasource, that is 'websearch' or 'vectorstore' depending on the question.";

pub const ROUTER_TEMPLATE: &str = "{{question}}";

pub const DOC_GRADER_SYSTEM: &str = "\
You are a grader assessing relevance of a retrieved document to a user question.

If the document contains keyword(s) or semantic meaning related to the question, grade it as relevant.";

pub const DOC_GRADER_TEMPLATE: &str = "\
Here is the retrieved document:

{{document}}

Here is the user question:

{{question}}

Carefully and objectively assess whether the document contains at least some information that is relevant to the question.

Return JSON with single key, binary_score, that is 'yes' or 'no' score to indicate whether the document contains at least some information that is relevant to the question.";

pub const HALLUCINATION_GRADER_SYSTEM: &str = "\
You are a teacher grading a quiz.

You will be given FACTS and a STUDENT ANSWER.

Here is the grade criteria to follow:

(1) Ensure the STUDENT ANSWER is grounded in the FACTS.

(2) Ensure the STUDENT ANSWER does not contain \"hallucinated\" information outside the scope of the FACTS.

Score:

A score of yes means that the student's answer meets all of the criteria. This is the highest (best) score.

A score of no means that the student's answer does not meet all of the criteria. This is the lowest possible score you can give.

Explain your reasoning in a step-by-step manner to ensure your reasoning and conclusion are correct.

Avoid simply stating the correct answer at the outset.";

pub const HALLUCINATION_GRADER_TEMPLATE: &str = "\
FACTS:

{{documents}}

STUDENT ANSWER: {{generation}}

Return JSON with two keys, binary_score is 'yes' or 'no' score to indicate whether the STUDENT ANSWER is grounded in the FACTS. And a key, explanation, that contains an explanation of the score.";

pub const ANSWER_GRADER_SYSTEM: &str = "\
You are a teacher grading a quiz.

You will be given a QUESTION and a STUDENT ANSWER.

Here is the grade criteria to follow:

(1) The STUDENT ANSWER helps to answer the QUESTION

Score:

A score of yes means that the student's answer meets all of the criteria. This is the highest (best) score.

The student can receive a score of yes if the answer contains extra information that is not explicitly asked for in the question.

A score of no means that the student's answer does not meet all of the criteria. This is the lowest possible score you can give.

Explain your reasoning in a step-by-step manner to ensure your reasoning and conclusion are correct.

Avoid simply stating the correct answer at the outset.";

pub const ANSWER_GRADER_TEMPLATE: &str = "\
QUESTION:

{{question}}

STUDENT ANSWER: {{generation}}

Return JSON with two keys, binary_score is 'yes' or 'no' score to indicate whether the STUDENT ANSWER meets the criteria. And a key, explanation, that contains an explanation of the score.";

pub const RAG_TEMPLATE: &str = "\
You are an assistant for question-answering tasks.

Here is the context to use to answer the question:

{{context}}

Think carefully about the above context.

Now, review the user question:

{{question}}

Provide an answer to this questions using only the above context.

Use three sentences maximum and keep the answer concise.

Answer:";
