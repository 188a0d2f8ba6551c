//! Quiz error types.

use thiserror::Error;

/// Errors raised while loading vocabulary or driving a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The vocabulary export could not be fetched.
    #[error("could not load vocabulary data: {0}")]
    DataSourceUnavailable(String),

    /// A required CSV column is missing from the header row.
    #[error("invalid vocabulary data format: column '{missing}' not found")]
    MalformedSchema { missing: String },

    /// The source parsed cleanly but produced no usable rows.
    #[error("no words were parsed from the data source")]
    EmptyDataset,

    /// The requested number of questions is outside `1..=max`.
    #[error("please enter a number between 1 and {max} (got {requested})")]
    InvalidQuestionCount { requested: usize, max: usize },

    /// Not enough distinct words to build a full set of options.
    #[error("need at least {required} distinct words to build a question, found {distinct}")]
    InsufficientVocabulary { distinct: usize, required: usize },

    #[error("question {index} is out of range (quiz has {total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("no quiz is in progress")]
    NoActiveQuiz,
}

impl QuizError {
    /// Whether the user can simply be asked again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuizError::InvalidQuestionCount { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_count_names_bounds() {
        let err = QuizError::InvalidQuestionCount {
            requested: 12,
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "please enter a number between 1 and 4 (got 12)"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn load_failures_are_fatal() {
        assert!(!QuizError::EmptyDataset.is_recoverable());
        assert!(!QuizError::DataSourceUnavailable("timeout".into()).is_recoverable());
        let schema = QuizError::MalformedSchema {
            missing: "Word".into(),
        };
        assert!(schema.to_string().contains("'Word'"));
    }
}
