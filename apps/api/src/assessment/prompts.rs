// All prompt constants for the assessment pipeline. Every template instructs
// the model to return JSON only; GeminiClient::call_json does the parsing.

/// Resume-to-JD matching. Replace `{job_description}` and `{resume_text}`.
pub const RESUME_ANALYSIS_PROMPT: &str = r#"You are an AI Resume-to-Job Matcher.
Analyze the provided job description and resume, and return a JSON object with this EXACT schema:

{
  "match_score": <integer 0-100, how well the resume matches the job description>,
  "matched_skills": [<skills explicitly found in both job description and resume>],
  "missing_skills": [<important skills from the job description not found in the resume>],
  "key_highlights": [<notable strengths, achievements, or experiences from the resume most relevant to the job description>],
  "questions": [<5 interview questions based on the job description and resume>]
}

### Input
Job Description: {job_description}
Resume Content: {resume_text}

### Output
Return only the JSON object in the exact format described above, without additional commentary."#;

/// Multiple-choice quiz generation. Replace `{job_description}` and `{resume_text}`.
pub const QUIZ_PROMPT: &str = r#"You are an AI Quiz Generator.
Analyze the provided job description and resume, and return a JSON object:

{
  "quiz": [
    {
      "question": <question text>,
      "options": [<list of 4 options>],
      "correct_answer": <correct answer>
    },
    ... (total 10 questions)
  ]
}

### Requirements
- Generate exactly 10 quiz questions.
- Each question must have 4 options and only 1 correct answer.
- Questions must be relevant to the job description and resume content.

### Input
Job Description: {job_description}
Resume Content: {resume_text}

### Output
Return only the JSON object in the exact format described above, without additional commentary."#;

/// Open coding/design Q&A generation. Replace `{job_description}` and `{resume_text}`.
pub const CODING_QA_PROMPT: &str = r#"You are an AI Interview Question & Answer Generator.
Generate 5 interview questions and their answers based on the provided job description and resume content.

### Requirements
- Generate exactly 5 interview questions.
- For each question, provide a concise and relevant answer.
- Questions should cover System Design, Code Review, Problem Solving, Database Design, and Performance Optimization.
- Each question and answer must be relevant to the job description and resume content.

### Input
Job Description: {job_description}
Resume Content: {resume_text}

### Output
Return only a JSON object in the following format, without additional commentary:
{
  "questions": [
    {"question": "<question text>", "answer": "<answer text>"},
    ... (total 5)
  ]
}"#;

/// Open text Q&A generation. Replace `{job_description}` and `{resume_text}`.
pub const TEXT_QA_PROMPT: &str = r#"You are an AI Interview Question & Answer Generator.
Create exactly 5 structured interview questions and answers tailored to the given job description and the candidate's resume.

### Instructions
- Generate exactly 5 interview questions.
- Each question must be clear, specific, and relevant to both the job description and the candidate's resume.
- Each answer must be concise (2-4 sentences), professional, and aligned with the candidate's skills and experience.
- Focus on technical expertise, problem-solving, past experience, and role-specific competencies.
- Do not include filler or generic questions (e.g., "Tell me about yourself").
- Strictly output valid JSON matching the schema below.

### Input
Job Description: {job_description}
Resume Content: {resume_text}

### Output Format
Return ONLY a JSON object in this exact structure, with no extra commentary:
{
  "questions": [
    {"question": "string", "answer": "string"},
    ... (total 5)
  ]
}"#;

/// Communication analysis over a batch of recorded answers.
/// Replace `{answers_json}`.
pub const COMMUNICATION_PROMPT: &str = r#"You are an AI evaluator that analyzes communication performance across multiple questions and answers.
Generate a Communication Analysis report with the following structure:

1. Communication Score: a single number 0-100 representing overall communication ability, based on fluency, clarity, and professionalism.
2. Fluency, Clarity, Professionalism: each a number 0-100.
   - Fluency reflects smoothness and natural flow of speech.
   - Clarity reflects how well the message is conveyed.
   - Professionalism reflects tone, politeness, and structure.
3. Key Metrics: response_time (average seconds per answer), filler_words (count), speech_rate (words per minute), confidence_level (Low, Medium, or High).
4. Feedback: 3-5 concise, actionable bullet points summarizing strengths (or weaknesses if the score is low).

Important rules:
- Scores must be consistent with input performance.
- Communication Score is a weighted average: Fluency 35%, Clarity 35%, Professionalism 30%.
- Return results as JSON:

{
  "communication_score": 72,
  "fluency": 93,
  "clarity": 92,
  "professionalism": 97,
  "key_metrics": {
    "response_time": "2.3s",
    "filler_words": 3,
    "speech_rate": "145 wpm",
    "confidence_level": "High"
  },
  "feedback": ["..."]
}

Input: {answers_json}"#;

/// Rubric scoring of a single open-form answer.
/// Replace `{question}` and `{answer}`.
pub const ANSWER_RUBRIC_PROMPT: &str = r#"Your task is to evaluate the user's answer to the interview question and provide a single overall score.

### Requirements
- Output only a JSON object with the following field:
{
  "overall_score": <float 0.0-100.0 representing the overall quality of the user's answer>
}

### Evaluation Criteria
- Relevance: how well the answer addresses the question.
- Completeness: whether the answer fully covers important aspects of the question.
- Clarity: how clear, structured, and understandable the answer is.
- Correctness: whether the answer is factually accurate and appropriate.

### Input
Question: {question}
User's Answer: {answer}"#;
