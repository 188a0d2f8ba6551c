use log::{debug, info};
use rand::Rng;

use crate::quiz::{
    shuffle, AnswerRecord, AnswerState, QuestionSpec, QuizError, VocabularyRecord, WordPool,
};

/// A sampled word and, once it has been shown, its generated question.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QuizItem {
    pub record: VocabularyRecord,
    pub question: Option<QuestionSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
}

/// A running quiz: the sampled questions, where the user is, and what they
/// answered so far.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    items: Vec<QuizItem>,
    current_index: usize,
    answers: Vec<Option<AnswerRecord>>,
    score: usize,
}

impl QuizSession {
    fn sample<R: Rng + ?Sized>(pool: &WordPool, count: usize, rng: &mut R) -> Self {
        let mut records = pool.records().to_vec();
        shuffle(&mut records, rng);
        records.truncate(count);

        Self {
            items: records
                .into_iter()
                .map(|record| QuizItem {
                    record,
                    question: None,
                })
                .collect(),
            current_index: 0,
            answers: vec![None; count],
            score: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    #[cfg(test)]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    pub fn answer_state(&self, index: usize) -> AnswerState {
        AnswerState::of(self.answer(index))
    }

    /// The question at `index`, generating it on first use. Later calls
    /// return the cached question unchanged.
    pub fn question<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        pool: &WordPool,
        rng: &mut R,
    ) -> Result<&QuestionSpec, QuizError> {
        let total = self.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(QuizError::QuestionOutOfRange { index, total })?;

        if item.question.is_none() {
            debug!("Generating question {} for '{}'", index, item.record.word);
            item.question = Some(QuestionSpec::generate(&item.record, pool, rng)?);
        }
        item.question
            .as_ref()
            .ok_or(QuizError::QuestionOutOfRange { index, total })
    }

    pub fn current_question<R: Rng + ?Sized>(
        &mut self,
        pool: &WordPool,
        rng: &mut R,
    ) -> Result<&QuestionSpec, QuizError> {
        self.question(self.current_index, pool, rng)
    }

    /// The question at `index` if it has already been generated.
    #[cfg(test)]
    pub fn cached_question(&self, index: usize) -> Option<&QuestionSpec> {
        self.items.get(index).and_then(|i| i.question.as_ref())
    }

    fn correct_word(&self, index: usize) -> Result<&str, QuizError> {
        self.items
            .get(index)
            .map(|i| i.record.word.as_str())
            .ok_or(QuizError::QuestionOutOfRange {
                index,
                total: self.len(),
            })
    }

    /// Records the user's choice for `index`. Does nothing if the question
    /// already has an answer.
    pub fn submit_answer(
        &mut self,
        index: usize,
        selected_word: &str,
    ) -> Result<AnswerState, QuizError> {
        let is_correct = self.correct_word(index)? == selected_word;
        if self.answers[index].is_some() {
            return Ok(self.answer_state(index));
        }

        self.answers[index] = Some(AnswerRecord {
            selected_word: selected_word.to_string(),
            is_correct,
            is_revealed: false,
        });
        if is_correct {
            self.score += 1;
        }
        debug!(
            "Question {} answered with '{}' (correct: {})",
            index, selected_word, is_correct
        );
        Ok(self.answer_state(index))
    }

    /// Marks `index` as revealed without crediting the score. Does nothing
    /// if the question already has an answer.
    pub fn reveal(&mut self, index: usize) -> Result<AnswerState, QuizError> {
        let correct_word = self.correct_word(index)?.to_string();
        if self.answers[index].is_none() {
            debug!("Question {} revealed", index);
            self.answers[index] = Some(AnswerRecord {
                selected_word: correct_word,
                is_correct: false,
                is_revealed: true,
            });
        }
        Ok(self.answer_state(index))
    }

    pub fn submit_current(&mut self, selected_word: &str) -> Result<AnswerState, QuizError> {
        self.submit_answer(self.current_index, selected_word)
    }

    pub fn reveal_current(&mut self) -> Result<AnswerState, QuizError> {
        self.reveal(self.current_index)
    }

    /// Next is only offered once the current question has an answer.
    pub fn can_advance(&self) -> bool {
        self.answer_state(self.current_index).is_answered()
    }

    pub fn can_retreat(&self) -> bool {
        self.current_index > 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.len()
    }

    /// One-based position and total, e.g. `(3, 10)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index + 1, self.len())
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            score: self.score,
            total: self.len(),
        }
    }
}

/// Result of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    Finished(QuizSummary),
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum Quiz {
    #[default]
    NotStarted,
    InProgress(QuizSession),
    Finished(QuizSummary),
}

impl Quiz {
    /// Starts a new quiz of `requested` questions sampled without replacement
    /// from `pool`, replacing whatever was there. An out-of-range count
    /// leaves the quiz untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        pool: &WordPool,
        requested: usize,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if requested < 1 || requested > pool.len() {
            return Err(QuizError::InvalidQuestionCount {
                requested,
                max: pool.len(),
            });
        }

        info!("Starting quiz with {} of {} words", requested, pool.len());
        *self = Quiz::InProgress(QuizSession::sample(pool, requested, rng));
        Ok(())
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match self {
            Quiz::InProgress(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        match self {
            Quiz::InProgress(session) => Some(session),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        match self {
            Quiz::Finished(summary) => Some(*summary),
            _ => None,
        }
    }

    /// Moves to the next question, or finishes the quiz when already on
    /// the last one.
    pub fn advance(&mut self) -> Result<Step, QuizError> {
        let session = self.session_mut().ok_or(QuizError::NoActiveQuiz)?;
        if !session.is_last() {
            session.current_index += 1;
            return Ok(Step::Moved(session.current_index));
        }

        let summary = session.summary();
        info!(
            "Quiz finished with {} out of {}",
            summary.score, summary.total
        );
        *self = Quiz::Finished(summary);
        Ok(Step::Finished(summary))
    }

    /// Moves back one question; stays put on the first.
    pub fn retreat(&mut self) -> Result<usize, QuizError> {
        let session = self.session_mut().ok_or(QuizError::NoActiveQuiz)?;
        if session.can_retreat() {
            session.current_index -= 1;
        }
        Ok(session.current_index)
    }

    pub fn restart(&mut self) {
        *self = Quiz::NotStarted;
    }
}
