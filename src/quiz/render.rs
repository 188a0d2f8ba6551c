//! Text for the chat front end. Everything returned here is Telegram HTML.

use teloxide::utils::html::escape;

use crate::quiz::{
    AnswerRecord, AnswerState, QuestionKind, QuestionSpec, QuizSession, QuizSummary,
    VocabularyRecord,
};

/// `(pronunciation)` linked to the audio file, when the sheet has both.
pub fn pronunciation_link(record: &VocabularyRecord) -> Option<String> {
    if record.pronunciation.is_empty() || record.audio_url.is_empty() {
        return None;
    }
    Some(format!(
        "<a href=\"{}\">({})</a>",
        escape(&record.audio_url),
        escape(&record.pronunciation)
    ))
}

fn prompt(question: &QuestionSpec, answered: bool) -> String {
    let correct = &question.correct_answer;
    match question.kind {
        QuestionKind::WordToMeaning => {
            let mut text = format!(
                "What is the meaning of \"<b>{}</b>\"?",
                escape(&correct.word)
            );
            if answered {
                if let Some(link) = pronunciation_link(correct) {
                    text.push(' ');
                    text.push_str(&link);
                }
            }
            text
        }
        QuestionKind::MeaningToWord => {
            format!("Which word means \"<b>{}</b>\"?", escape(&correct.meaning))
        }
    }
}

/// Button text for option `position` (zero-based).
pub fn option_button(question: &QuestionSpec, position: usize) -> Option<String> {
    question
        .options
        .get(position)
        .map(|o| format!("{}. {}", position + 1, question.kind.option_text(o)))
}

pub fn option_buttons(question: &QuestionSpec) -> Vec<String> {
    (0..question.options.len())
        .filter_map(|i| option_button(question, i))
        .collect()
}

/// Maps a pressed button (or typed text) back to the option it names.
///
/// Accepts the numbered button text, a bare number, or the option text.
pub fn parse_option<'a>(question: &'a QuestionSpec, text: &str) -> Option<&'a VocabularyRecord> {
    let text = text.trim();
    let number = text.split('.').next().unwrap_or_default().trim();
    if let Ok(n) = number.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| question.options.get(i)) {
            return Some(option);
        }
    }
    question
        .options
        .iter()
        .find(|o| question.kind.option_text(o) == text)
}

fn option_line(question: &QuestionSpec, answer: Option<&AnswerRecord>, position: usize) -> String {
    let option = &question.options[position];
    let mut line = format!(
        "{}. {}",
        position + 1,
        escape(question.kind.option_text(option))
    );

    if let Some(answer) = answer {
        if question.is_correct(&option.word) {
            line.insert_str(0, "✅ ");
            if let Some(link) = pronunciation_link(option) {
                line.push(' ');
                line.push_str(&link);
            }
        } else if option.word == answer.selected_word {
            line.insert_str(0, "❌ ");
        }
    }
    line
}

pub fn feedback(question: &QuestionSpec, answer: &AnswerRecord) -> String {
    let correct = escape(question.kind.option_text(&question.correct_answer));
    match AnswerState::of(Some(answer)) {
        AnswerState::Correct => "Correct!".to_string(),
        AnswerState::Revealed => format!("Answer revealed: \"{}\"", correct),
        _ => format!("Wrong! The correct answer was \"{}\".", correct),
    }
}

/// The full message for the current question: prompt, options, feedback
/// once answered, and progress.
pub fn question_message(session: &QuizSession, question: &QuestionSpec) -> String {
    let answer = session.answer(session.current_index());

    let mut parts = vec![prompt(question, answer.is_some()), String::new()];
    parts.extend((0..question.options.len()).map(|i| option_line(question, answer, i)));

    if let Some(answer) = answer {
        parts.push(String::new());
        parts.push(feedback(question, answer));
    }

    parts.push(String::new());
    let (position, total) = session.progress();
    parts.push(format!("Question {} of {}", position, total));
    parts.join("\n")
}

pub fn summary_message(summary: &QuizSummary) -> String {
    format!(
        "<b>Quiz Complete!</b>\nYour final score is: <b>{} out of {}</b>",
        summary.score, summary.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::tests::sample_pool;
    use crate::quiz::Quiz;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(kind: QuestionKind) -> QuestionSpec {
        QuestionSpec {
            kind,
            options: vec![
                VocabularyRecord::new("Perro", "Dog"),
                VocabularyRecord::new("Gato", "Cat")
                    .with_pronunciation("ˈɡa.to", "https://audio.example/gato.mp3"),
                VocabularyRecord::new("Sol", "Sun"),
                VocabularyRecord::new("Casa", "House & home"),
            ],
            correct_answer: VocabularyRecord::new("Gato", "Cat")
                .with_pronunciation("ˈɡa.to", "https://audio.example/gato.mp3"),
        }
    }

    #[test]
    fn pronunciation_needs_both_fields() {
        let record = VocabularyRecord::new("Sol", "Sun").with_pronunciation("sol", "");
        assert_eq!(pronunciation_link(&record), None);
        let record = record.with_pronunciation("sol", "https://a/sol.mp3");
        assert_eq!(
            pronunciation_link(&record).unwrap(),
            "<a href=\"https://a/sol.mp3\">(sol)</a>"
        );
    }

    #[test]
    fn buttons_are_numbered_by_kind() {
        let q = question(QuestionKind::WordToMeaning);
        assert_eq!(
            option_buttons(&q),
            vec!["1. Dog", "2. Cat", "3. Sun", "4. House & home"]
        );
        let q = question(QuestionKind::MeaningToWord);
        assert_eq!(option_button(&q, 1).unwrap(), "2. Gato");
        assert_eq!(option_button(&q, 4), None);
    }

    #[test]
    fn parse_option_accepts_buttons_numbers_and_text() {
        let q = question(QuestionKind::WordToMeaning);
        assert_eq!(parse_option(&q, "2. Cat").unwrap().word, "Gato");
        assert_eq!(parse_option(&q, " 3 ").unwrap().word, "Sol");
        assert_eq!(parse_option(&q, "Dog").unwrap().word, "Perro");
        assert!(parse_option(&q, "5. Nope").is_none());
        assert!(parse_option(&q, "0").is_none());
        assert!(parse_option(&q, "Reveal").is_none());
    }

    #[test]
    fn feedback_variants() {
        let q = question(QuestionKind::MeaningToWord);
        let mut answer = AnswerRecord {
            selected_word: "Gato".into(),
            is_correct: true,
            is_revealed: false,
        };
        assert_eq!(feedback(&q, &answer), "Correct!");

        answer.is_correct = false;
        answer.is_revealed = true;
        assert_eq!(feedback(&q, &answer), "Answer revealed: \"Gato\"");

        answer.is_revealed = false;
        answer.selected_word = "Sol".into();
        assert_eq!(
            feedback(&q, &answer),
            "Wrong! The correct answer was \"Gato\"."
        );
    }

    #[test]
    fn unanswered_message_hides_marks() {
        let pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(12);
        let mut quiz = Quiz::default();
        quiz.start(&pool, 2, &mut rng).unwrap();
        let session = quiz.session_mut().unwrap();
        let q = session.current_question(&pool, &mut rng).unwrap().clone();

        let text = question_message(session, &q);
        assert!(text.ends_with("Question 1 of 2"));
        assert!(!text.contains('✅'));
        assert!(!text.contains("Correct!"));
    }

    #[test]
    fn answered_message_marks_options() {
        let pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(12);
        let mut quiz = Quiz::default();
        quiz.start(&pool, 3, &mut rng).unwrap();
        let session = quiz.session_mut().unwrap();
        let q = session.current_question(&pool, &mut rng).unwrap().clone();
        let wrong = q
            .options
            .iter()
            .find(|o| !q.is_correct(&o.word))
            .unwrap()
            .word
            .clone();
        session.submit_current(&wrong).unwrap();

        let text = question_message(session, &q);
        assert_eq!(text.matches('✅').count(), 1);
        assert_eq!(text.matches('❌').count(), 1);
        assert!(text.contains("Wrong! The correct answer was"));
        assert!(text.ends_with("Question 1 of 3"));
    }

    #[test]
    fn progress_follows_navigation() {
        let pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(5);
        let mut quiz = Quiz::default();
        quiz.start(&pool, 3, &mut rng).unwrap();
        quiz.session_mut().unwrap().reveal_current().unwrap();
        quiz.advance().unwrap();

        let session = quiz.session_mut().unwrap();
        let q = session.current_question(&pool, &mut rng).unwrap().clone();
        let text = question_message(session, &q);
        assert!(text.ends_with("Question 2 of 3"));
        assert!(!text.contains("Answer revealed"));
    }

    #[test]
    fn html_is_escaped() {
        let q = question(QuestionKind::WordToMeaning);
        let line = option_line(&q, None, 3);
        assert_eq!(line, "4. House &amp; home");
    }

    #[test]
    fn summary_text() {
        let text = summary_message(&QuizSummary { score: 3, total: 5 });
        assert!(text.contains("Quiz Complete!"));
        assert!(text.contains("3 out of 5"));
    }
}
