//! crates/studyaid_core/src/quiz.rs
//!
//! The short-lived quiz attempt state machine: one question at a time,
//! 10 points per correct answer, a badge computed at the end.

use serde::Serialize;

use crate::domain::{BadgeTier, Question};

pub const POINTS_PER_QUESTION: u32 = 10;

/// A user's in-flight quiz attempt for one topic. Created when a quiz is
/// started, mutated by answer submissions, and discarded when a new quiz is
/// started or the study session is replaced.
#[derive(Debug, Clone)]
pub struct QuizSession {
    topic: String,
    questions: Vec<Question>,
    current: usize,
    score: u32,
}

/// What the quiz looks like from the outside after any transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizProgress {
    InProgress {
        index: usize,
        total: usize,
        question: Question,
    },
    Completed {
        score: u32,
        max_score: u32,
        percentage: u32,
        badge: Option<QuizBadge>,
    },
}

/// The badge payload shown on the results page.
#[derive(Debug, Clone, Serialize)]
pub struct QuizBadge {
    pub tier: BadgeTier,
    pub name: &'static str,
    pub description: &'static str,
}

impl QuizSession {
    pub fn new(topic: String, questions: Vec<Question>) -> Self {
        Self {
            topic,
            questions,
            current: 0,
            score: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Scores `answer` against the current question (case-insensitive exact
    /// match) and advances. Returns whether the answer was correct, or
    /// `None` if the quiz was already completed.
    pub fn submit(&mut self, answer: &str) -> Option<bool> {
        let question = self.questions.get(self.current)?;
        let correct = answer.trim().eq_ignore_ascii_case(question.answer.trim());
        if correct {
            self.score += POINTS_PER_QUESTION;
        }
        self.current += 1;
        Some(correct)
    }

    /// The current question or, once every question has been answered, the
    /// final results.
    pub fn progress(&self) -> QuizProgress {
        match self.questions.get(self.current) {
            Some(question) => QuizProgress::InProgress {
                index: self.current,
                total: self.questions.len(),
                question: question.clone(),
            },
            None => {
                let max_score = self.questions.len() as u32 * POINTS_PER_QUESTION;
                let percentage = if max_score == 0 {
                    0
                } else {
                    self.score * 100 / max_score
                };
                let badge = BadgeTier::for_percentage(percentage).map(|tier| QuizBadge {
                    tier,
                    name: tier.name(),
                    description: tier.description(),
                });
                QuizProgress::Completed {
                    score: self.score,
                    max_score,
                    percentage,
                    badge,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionKind;

    fn blank_question(answer: &str) -> Question {
        Question {
            kind: QuestionKind::FillInTheBlank,
            prompt: "____".to_string(),
            options: Vec::new(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn five_questions_three_correct_earns_third_tier() {
        let questions: Vec<Question> =
            (0..5).map(|i| blank_question(&format!("answer{}", i))).collect();
        let mut quiz = QuizSession::new("Sorting".to_string(), questions);

        // Correct on questions 1, 3 and 5; wrong on 2 and 4. Matching is
        // case-insensitive.
        assert_eq!(quiz.submit("ANSWER0"), Some(true));
        assert_eq!(quiz.submit("wrong"), Some(false));
        assert_eq!(quiz.submit("Answer2"), Some(true));
        assert_eq!(quiz.submit("also wrong"), Some(false));
        assert_eq!(quiz.submit("answer4"), Some(true));

        assert!(quiz.is_completed());
        match quiz.progress() {
            QuizProgress::Completed {
                score,
                max_score,
                percentage,
                badge,
            } => {
                assert_eq!(score, 30);
                assert_eq!(max_score, 50);
                assert_eq!(percentage, 60);
                assert_eq!(badge.unwrap().tier, BadgeTier::SolidFoundation);
            }
            other => panic!("expected completed quiz, got {:?}", other),
        }
    }

    #[test]
    fn submitting_past_the_end_is_rejected() {
        let mut quiz = QuizSession::new("X".to_string(), vec![blank_question("a")]);
        assert_eq!(quiz.submit("a"), Some(true));
        assert_eq!(quiz.submit("a"), None);
        assert_eq!(quiz.score(), POINTS_PER_QUESTION);
    }

    #[test]
    fn perfect_score_earns_top_tier() {
        let mut quiz = QuizSession::new(
            "X".to_string(),
            vec![blank_question("a"), blank_question("b")],
        );
        quiz.submit("a");
        quiz.submit("b");
        match quiz.progress() {
            QuizProgress::Completed { badge, .. } => {
                assert_eq!(badge.unwrap().tier, BadgeTier::TopicMaster);
            }
            other => panic!("expected completed quiz, got {:?}", other),
        }
    }

    #[test]
    fn progress_reports_the_current_question() {
        let quiz = QuizSession::new("X".to_string(), vec![blank_question("a")]);
        match quiz.progress() {
            QuizProgress::InProgress { index, total, .. } => {
                assert_eq!(index, 0);
                assert_eq!(total, 1);
            }
            other => panic!("expected in-progress quiz, got {:?}", other),
        }
    }
}
