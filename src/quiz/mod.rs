pub mod csv;
pub mod error;
pub mod render;
pub mod session;
pub mod source;

use std::collections::HashSet;

use rand::Rng;

pub use error::QuizError;
pub use session::{Quiz, QuizSession, QuizSummary, Step};

/// Number of choices offered for every question.
pub const OPTION_COUNT: usize = 4;

/// One row of the vocabulary sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VocabularyRecord {
    pub word: String,
    pub meaning: String,
    /// Empty when the sheet has no pronunciation for this word.
    pub pronunciation: String,
    pub audio_url: String,
}

impl VocabularyRecord {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_pronunciation(
        mut self,
        pronunciation: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        self.pronunciation = pronunciation.into();
        self.audio_url = audio_url.into();
        self
    }
}

/// Every record available for building questions.
#[derive(Debug, Clone, Default)]
pub struct WordPool {
    records: Vec<VocabularyRecord>,
    distinct_words: usize,
}

impl WordPool {
    pub fn new(records: Vec<VocabularyRecord>) -> Self {
        let distinct_words = records
            .iter()
            .map(|r| r.word.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            records,
            distinct_words,
        }
    }

    pub fn records(&self) -> &[VocabularyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn distinct_words(&self) -> usize {
        self.distinct_words
    }

    /// Fails unless every question can get [`OPTION_COUNT`] options with
    /// different words.
    pub fn check_distinct_words(&self) -> Result<(), QuizError> {
        if self.distinct_words < OPTION_COUNT {
            return Err(QuizError::InsufficientVocabulary {
                distinct: self.distinct_words,
                required: OPTION_COUNT,
            });
        }
        Ok(())
    }

    fn random_record<R: Rng + ?Sized>(&self, rng: &mut R) -> &VocabularyRecord {
        &self.records[rng.gen_range(0..self.records.len())]
    }
}

/// In-place Fisher-Yates shuffle: for i from the last index down to 1,
/// swap element i with a uniformly chosen element in `0..=i`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum QuestionKind {
    /// Show the word, pick its meaning.
    WordToMeaning,
    /// Show the meaning, pick the word.
    MeaningToWord,
}

impl QuestionKind {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            QuestionKind::WordToMeaning
        } else {
            QuestionKind::MeaningToWord
        }
    }

    /// The side of `record` that is shown on an option button.
    pub fn option_text<'a>(&self, record: &'a VocabularyRecord) -> &'a str {
        match self {
            QuestionKind::WordToMeaning => &record.meaning,
            QuestionKind::MeaningToWord => &record.word,
        }
    }
}

/// A generated multiple-choice question. Built once per quiz question and
/// kept so the distractors stay stable while the user navigates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionSpec {
    pub kind: QuestionKind,
    pub options: Vec<VocabularyRecord>,
    pub correct_answer: VocabularyRecord,
}

impl QuestionSpec {
    /// Builds a question for `record` with distractors drawn from `pool`.
    ///
    /// The pool must hold at least [`OPTION_COUNT`] distinct words, otherwise
    /// the distractor draw could never finish.
    pub fn generate<R: Rng + ?Sized>(
        record: &VocabularyRecord,
        pool: &WordPool,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        pool.check_distinct_words()?;

        let kind = QuestionKind::random(rng);

        let mut options = Vec::with_capacity(OPTION_COUNT);
        options.push(record.clone());
        while options.len() < OPTION_COUNT {
            let candidate = pool.random_record(rng);
            if !options.iter().any(|o| o.word == candidate.word) {
                options.push(candidate.clone());
            }
        }
        shuffle(&mut options, rng);

        Ok(Self {
            kind,
            options,
            correct_answer: record.clone(),
        })
    }

    pub fn is_correct(&self, word: &str) -> bool {
        self.correct_answer.word == word
    }

    #[cfg(test)]
    pub fn option_by_word(&self, word: &str) -> Option<&VocabularyRecord> {
        self.options.iter().find(|o| o.word == word)
    }
}

/// What the user did with a question. Written once, never replaced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerRecord {
    pub selected_word: String,
    pub is_correct: bool,
    pub is_revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    Unanswered,
    Correct,
    Revealed,
    Incorrect,
}

impl AnswerState {
    pub fn of(answer: Option<&AnswerRecord>) -> Self {
        match answer {
            None => AnswerState::Unanswered,
            Some(a) if a.is_correct => AnswerState::Correct,
            Some(a) if a.is_revealed => AnswerState::Revealed,
            Some(_) => AnswerState::Incorrect,
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, AnswerState::Unanswered)
    }
}
