use crate::models::answer::Answer;
use crate::models::quiz_question::QuizQuestion;
use std::collections::HashMap;
use uuid::Uuid;

/// Verdict for one graded answer row.
#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub answer_id: Uuid,
    pub quiz_question_id: Uuid,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub score: i32,
    pub wrong_answers: i32,
    pub unanswered_questions: i32,
    pub graded: Vec<GradedAnswer>,
}

pub struct GradingService;

impl GradingService {
    /// Classify every snapshot question as exactly one of correct, wrong
    /// or unanswered by joining the session's answers against the
    /// snapshots' correct options. Pure: persistence is the caller's job.
    pub fn grade(questions: &[QuizQuestion], answers: &[Answer]) -> GradeOutcome {
        let by_question: HashMap<Uuid, &Answer> = answers
            .iter()
            .map(|a| (a.quiz_question_id, a))
            .collect();

        let mut score = 0;
        let mut wrong_answers = 0;
        let mut unanswered_questions = 0;
        let mut graded = Vec::with_capacity(answers.len());

        for question in questions {
            match by_question.get(&question.id) {
                Some(answer) => {
                    let is_correct = answer.selected_option == question.correct_option;
                    if is_correct {
                        score += 1;
                    } else {
                        wrong_answers += 1;
                    }
                    graded.push(GradedAnswer {
                        answer_id: answer.id,
                        quiz_question_id: question.id,
                        is_correct,
                    });
                }
                None => unanswered_questions += 1,
            }
        }

        GradeOutcome {
            score,
            wrong_answers,
            unanswered_questions,
            graded,
        }
    }

    /// Derived view value, two decimal places. Guards against a zero
    /// question count even though quiz creation rejects empty quizzes.
    pub fn score_percentage(score: i32, question_count: i32) -> f64 {
        if question_count <= 0 {
            return 0.0;
        }
        ((score as f64 / question_count as f64) * 10000.0).round() / 100.0
    }

    /// Pass/fail compares the raw ratio, not the rounded percentage.
    pub fn passed(score: i32, question_count: i32, passing_ratio: f64) -> bool {
        if question_count <= 0 {
            return false;
        }
        score as f64 / question_count as f64 >= passing_ratio
    }
}
