mod config;
mod quiz;

use std::sync::Arc;

use dotenv::dotenv;
use log::{debug, error, info, warn};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    prelude::*,
    types::{ChatId, KeyboardButton, KeyboardMarkup, ParseMode},
};

use config::Config;
use quiz::{render, QuestionSpec, Quiz, QuizError, QuizSession, QuizSummary, Step, WordPool};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type DialogueStorage = Arc<ErasedStorage<State>>;
/// The word pool loaded at start-up, or the reason it could not be loaded.
type Vocabulary = Arc<Result<WordPool, QuizError>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveQuestionCount,
    InQuiz {
        quiz: Quiz,
    },
}

#[tokio::main]
async fn main() {
    // A .env file is optional; plain environment variables work too.
    dotenv().ok();

    pretty_env_logger::init();
    info!("Starting flashcard bot...");

    let config = Config::from_env();
    let vocabulary: Vocabulary = Arc::new(
        quiz::source::fetch_vocabulary(&config.vocab_url, config.fetch_timeout)
            .await
            .and_then(|pool| pool.check_distinct_words().map(|_| pool)),
    );
    if let Err(err) = vocabulary.as_ref() {
        error!("Failed to load vocabulary: {}", err);
    }

    let bot = Bot::from_env();
    let storage: DialogueStorage = InMemStorage::<State>::new().erase();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(
                dptree::filter(|msg: Message| msg.text() == Some(START_COMMAND)).endpoint(start),
            )
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveQuestionCount].endpoint(receive_question_count))
            .branch(dptree::case![State::InQuiz { quiz }].endpoint(in_quiz)),
    )
    .dependencies(dptree::deps![storage, vocabulary])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const START_COMMAND: &str = "/start";
const BACK_BUTTON: &str = "⬅ Back";
const REVEAL_BUTTON: &str = "Reveal";
const NEXT_BUTTON: &str = "Next ➡";
const FINISH_BUTTON: &str = "Finish Quiz";
const TRY_AGAIN_BUTTON: &str = "Try Again";

const GREETING_TEXT: &str = "Hi! I'm a vocabulary flashcard bot. I'll ask you multiple-choice questions about words from the vocabulary sheet.";

async fn start(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    vocabulary: Vocabulary,
) -> HandlerResult {
    info!("Chat {} started", msg.chat.id);
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    match vocabulary.as_ref() {
        Ok(pool) => {
            ask_question_count(&bot, msg.chat.id, pool).await?;
            dialogue.update(State::ReceiveQuestionCount).await?;
        }
        Err(err) => {
            bot.send_message(
                msg.chat.id,
                format!("Error: Could not load vocabulary data ({}).", err),
            )
            .await?;
            dialogue.update(State::Start).await?;
        }
    }
    Ok(())
}

async fn ask_question_count(bot: &Bot, chat_id: ChatId, pool: &WordPool) -> HandlerResult {
    let mut suggestions: Vec<usize> = [5, 10, 15]
        .into_iter()
        .filter(|n| *n < pool.len())
        .collect();
    suggestions.push(pool.len());

    let keyboard = KeyboardMarkup::new(vec![suggestions
        .iter()
        .map(|n| KeyboardButton::new(n.to_string()))
        .collect::<Vec<_>>()]);

    bot.send_message(
        chat_id,
        format!("How many questions would you like? (1-{})", pool.len()),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

async fn receive_question_count(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    vocabulary: Vocabulary,
) -> HandlerResult {
    let pool = match vocabulary.as_ref() {
        Ok(pool) => pool,
        Err(_) => return start(bot, dialogue, msg, vocabulary.clone()).await,
    };

    let requested = msg
        .text()
        .and_then(|text| text.trim().parse::<usize>().ok());

    let mut quiz = Quiz::default();
    let started = match requested {
        Some(requested) => quiz.start(pool, requested, &mut rand::thread_rng()),
        None => Err(QuizError::InvalidQuestionCount {
            requested: 0,
            max: pool.len(),
        }),
    };
    if let Err(err) = started {
        if !err.is_recoverable() {
            return Err(err.into());
        }
        warn!("Chat {}: rejected question count: {}", msg.chat.id, err);
        bot.send_message(
            msg.chat.id,
            format!("Please enter a number between 1 and {}.", pool.len()),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Great! Let's begin.").await?;
    show_question(&bot, msg.chat.id, &mut quiz, pool).await?;

    dialogue.update(State::InQuiz { quiz }).await?;
    Ok(())
}

async fn in_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    mut quiz: Quiz,
    msg: Message,
    vocabulary: Vocabulary,
) -> HandlerResult {
    let pool = match vocabulary.as_ref() {
        Ok(pool) => pool,
        Err(_) => return start(bot, dialogue, msg, vocabulary.clone()).await,
    };
    let text = msg.text().unwrap_or_default().trim();

    if let Some(summary) = quiz.summary() {
        if text == TRY_AGAIN_BUTTON {
            quiz.restart();
            ask_question_count(&bot, msg.chat.id, pool).await?;
            dialogue.update(State::ReceiveQuestionCount).await?;
        } else {
            send_summary(&bot, msg.chat.id, &summary).await?;
        }
        return Ok(());
    }
    if quiz.session().is_none() {
        ask_question_count(&bot, msg.chat.id, pool).await?;
        dialogue.update(State::ReceiveQuestionCount).await?;
        return Ok(());
    }

    match text {
        BACK_BUTTON => {
            let index = quiz.retreat()?;
            debug!("Chat {}: back to question {}", msg.chat.id, index);
        }
        REVEAL_BUTTON => {
            let session = quiz.session_mut().ok_or(QuizError::NoActiveQuiz)?;
            session.reveal_current()?;
        }
        NEXT_BUTTON | FINISH_BUTTON => {
            if !quiz.session().map_or(false, QuizSession::can_advance) {
                warn!("Chat {}: tried to move on before answering", msg.chat.id);
                bot.send_message(msg.chat.id, "Pick an answer or press Reveal first.")
                    .await?;
                return Ok(());
            }
            if let Step::Finished(summary) = quiz.advance()? {
                send_summary(&bot, msg.chat.id, &summary).await?;
                dialogue.update(State::InQuiz { quiz }).await?;
                return Ok(());
            }
        }
        choice => {
            let session = quiz.session_mut().ok_or(QuizError::NoActiveQuiz)?;
            let question = session
                .current_question(pool, &mut rand::thread_rng())?
                .clone();
            match render::parse_option(&question, choice) {
                Some(option) => {
                    let state = session.submit_current(&option.word)?;
                    debug!(
                        "Chat {}: {:?}, score {}",
                        msg.chat.id,
                        state,
                        session.score()
                    );
                }
                None => {
                    warn!("Chat {}: unrecognised reply {:?}", msg.chat.id, choice);
                    bot.send_message(msg.chat.id, "Please choose one of the options.")
                        .await?;
                    return Ok(());
                }
            }
        }
    }

    show_question(&bot, msg.chat.id, &mut quiz, pool).await?;
    dialogue.update(State::InQuiz { quiz }).await?;
    Ok(())
}

fn render_current(
    quiz: &mut Quiz,
    pool: &WordPool,
) -> Result<(String, KeyboardMarkup), QuizError> {
    let session = quiz.session_mut().ok_or(QuizError::NoActiveQuiz)?;
    let index = session.current_index();
    let question = session
        .question(index, pool, &mut rand::thread_rng())?
        .clone();

    let text = render::question_message(session, &question);
    Ok((text, quiz_keyboard(session, &question)))
}

fn quiz_keyboard(session: &QuizSession, question: &QuestionSpec) -> KeyboardMarkup {
    let answered = session.can_advance();

    let mut rows: Vec<Vec<KeyboardButton>> = Vec::new();
    if !answered {
        rows.extend(
            render::option_buttons(question)
                .into_iter()
                .map(|b| vec![KeyboardButton::new(b)]),
        );
    }

    let mut controls = Vec::new();
    if session.can_retreat() {
        controls.push(KeyboardButton::new(BACK_BUTTON));
    }
    if !answered {
        controls.push(KeyboardButton::new(REVEAL_BUTTON));
    } else if session.is_last() {
        controls.push(KeyboardButton::new(FINISH_BUTTON));
    } else {
        controls.push(KeyboardButton::new(NEXT_BUTTON));
    }
    rows.push(controls);

    KeyboardMarkup::new(rows)
}

async fn show_question(
    bot: &Bot,
    chat_id: ChatId,
    quiz: &mut Quiz,
    pool: &WordPool,
) -> HandlerResult {
    let (text, keyboard) = render_current(quiz, pool)?;
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn send_summary(bot: &Bot, chat_id: ChatId, summary: &QuizSummary) -> HandlerResult {
    bot.send_message(chat_id, render::summary_message(summary))
        .parse_mode(ParseMode::Html)
        .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new(
            TRY_AGAIN_BUTTON,
        )]]))
        .await?;
    Ok(())
}
