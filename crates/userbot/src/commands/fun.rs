//! Fun commands: dice, jokes, quotes, love calculator, quiz.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::CommandOutcome;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

const DICE_FACES: [&str; 6] = ["⚀", "⚁", "⚂", "⚃", "⚄", "⚅"];

const JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything!",
    "Why did the scarecrow win an award? He was outstanding in his field!",
    "Why don't skeletons fight each other? They don't have the guts!",
    "What do you call a fake noodle? An impasta!",
    "Why did the math book look so sad? Because it had too many problems!",
];

const QUOTES: &[&str] = &[
    "The only way to do great work is to love what you do. - Steve Jobs",
    "Innovation distinguishes between a leader and a follower. - Steve Jobs",
    "The future belongs to those who believe in the beauty of their dreams. - Eleanor Roosevelt",
    "Strive not to be a success, but rather to be of value. - Albert Einstein",
    "The way to get started is to quit talking and begin doing. - Walt Disney",
];

struct Question {
    question: &'static str,
    options: [&'static str; 4],
}

const QUESTIONS: &[Question] = &[
    Question {
        question: "What is the capital of France?",
        options: ["London", "Berlin", "Paris", "Madrid"],
    },
    Question {
        question: "Which planet is known as the Red Planet?",
        options: ["Venus", "Mars", "Jupiter", "Saturn"],
    },
];

fn pick(items: &[&'static str]) -> &'static str {
    items.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

pub struct DiceHandler;

impl DiceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiceHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for DiceHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let roll: usize = rand::thread_rng().gen_range(1..=6);
        Ok(CommandOutput::new(
            format!(
                "🎲 **Dice Roll**\n\nYou rolled: **{}**\n\n{}",
                roll,
                DICE_FACES[roll - 1]
            ),
            "Dice rolled",
        )
        .with_data(serde_json::json!({ "roll": roll })))
    }
}

pub struct JokeHandler;

impl JokeHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JokeHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for JokeHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        Ok(CommandOutput::new(
            format!("😂 **Random Joke**\n\n{}", pick(JOKES)),
            "Joke sent",
        ))
    }
}

pub struct QuoteHandler;

impl QuoteHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuoteHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for QuoteHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        Ok(CommandOutput::new(
            format!("💫 **Inspirational Quote**\n\n\"{}\"", pick(QUOTES)),
            "Quote sent",
        ))
    }
}

/// Compatibility label for a 1..=100 score.
fn compatibility(score: u32) -> &'static str {
    match score {
        81.. => "💖 Perfect match!",
        61..=80 => "💕 Great compatibility",
        41..=60 => "💝 Good potential",
        21..=40 => "❤️ Could work",
        _ => "💔 Not great",
    }
}

pub struct LoveHandler;

impl LoveHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoveHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for LoveHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let you = ctx.event.sender_name.clone().unwrap_or_else(|| "You".to_string());
        let them = if ctx.args.is_empty() {
            "Someone".to_string()
        } else {
            ctx.rest()
        };
        let score: u32 = rand::thread_rng().gen_range(1..=100);

        let reply = format!(
            "💑 **Love Calculator**\n\n\
             👤 **{}** + **{}**\n\
             💖 **Love Score:** {}%\n\
             📊 **Compatibility:** {}\n\n\
             _Just for fun! Don't take it seriously 😊_",
            you,
            them,
            score,
            compatibility(score)
        );

        Ok(CommandOutput::new(reply, "Love calculated").with_data(serde_json::json!({ "score": score })))
    }
}

pub struct QuizHandler;

impl QuizHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuizHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for QuizHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let idx = rand::thread_rng().gen_range(0..QUESTIONS.len());
        let question = &QUESTIONS[idx];
        let options = question
            .options
            .iter()
            .enumerate()
            .map(|(i, opt)| format!("{}. {}", i + 1, opt))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(CommandOutput::new(
            format!(
                "🧠 **Quiz Time!**\n\n❓ **Question:** {}\n\n{}\n\n💡 Reply with the number (1-4) of your answer!",
                question.question, options
            ),
            "Quiz started",
        ))
    }
}
