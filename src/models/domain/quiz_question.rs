use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub lesson_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    /// Answers match after trimming surrounding whitespace.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.correct_answer.trim()
    }
}
