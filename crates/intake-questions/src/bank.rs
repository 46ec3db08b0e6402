use intake_core::models::form::{
    AppetiteChanges, Choice, ConcernDuration, SchoolPerformance, SleepPatterns,
    SocialRelationships, SEVERITY_LABELS,
};
use intake_core::models::question::{QuestionCategory, StructuredQuestion};

use crate::QuestionBank;

/// The built-in child intake question bank. Options are the labels of the
/// form's choice sets so answers map back onto form fields.
pub struct ChildIntakeBank;

impl QuestionBank for ChildIntakeBank {
    fn id(&self) -> &str {
        "child_intake_v1"
    }

    fn questions(&self) -> &[StructuredQuestion] {
        static QUESTIONS: std::sync::LazyLock<Vec<StructuredQuestion>> =
            std::sync::LazyLock::new(|| {
                vec![
                    question(
                        "concern_duration",
                        QuestionCategory::ConcernDuration,
                        "How long have you been noticing these concerns?",
                        ConcernDuration::labels(),
                        false,
                    ),
                    question(
                        "concern_severity",
                        QuestionCategory::ConcernSeverity,
                        "How much are these concerns affecting your child right now?",
                        SEVERITY_LABELS.iter().map(|l| l.to_string()).collect(),
                        false,
                    ),
                    question(
                        "sleep_patterns",
                        QuestionCategory::SleepPatterns,
                        "How has your child been sleeping lately?",
                        SleepPatterns::labels(),
                        true,
                    ),
                    question(
                        "appetite_changes",
                        QuestionCategory::AppetiteChanges,
                        "Have you noticed any change in your child's appetite?",
                        AppetiteChanges::labels(),
                        true,
                    ),
                    question(
                        "school_performance",
                        QuestionCategory::SchoolPerformance,
                        "How are things going at school?",
                        SchoolPerformance::labels(),
                        true,
                    ),
                    question(
                        "social_relationships",
                        QuestionCategory::SocialRelationships,
                        "How are your child's relationships with friends and family?",
                        SocialRelationships::labels(),
                        true,
                    ),
                    question(
                        "therapy_goals",
                        QuestionCategory::TherapyGoals,
                        "What would you most like therapy to help with?",
                        vec![
                            "Help with anxiety and worry".to_string(),
                            "Help with sadness or low mood".to_string(),
                            "Help managing anger and behavior".to_string(),
                            "Help building confidence and friendships".to_string(),
                        ],
                        true,
                    ),
                ]
            });
        &QUESTIONS
    }
}

fn question(
    id: &str,
    category: QuestionCategory,
    text: &str,
    options: Vec<String>,
    allow_other: bool,
) -> StructuredQuestion {
    StructuredQuestion {
        id: id.to_string(),
        question_type: category,
        question: text.to_string(),
        options,
        allow_other,
    }
}
