//! Interactive prompt engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Input,
    List,
    Confirm,
    Password,
}

/// A single question put to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub message: String,
    pub kind: PromptKind,
    pub choices: Vec<String>,
}

#[async_trait]
pub trait Prompter: Send + Sync {
    async fn prompt(&self, question: Question) -> Result<String>;
}

/// Terminal prompts backed by `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    fn ask(question: Question) -> Result<String> {
        use dialoguer::{Confirm, Input, Password, Select};

        let answer = match question.kind {
            PromptKind::Input => Input::<String>::new()
                .with_prompt(&question.message)
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?,
            PromptKind::Password => Password::new()
                .with_prompt(&question.message)
                .interact()
                .map_err(prompt_error)?,
            PromptKind::Confirm => Confirm::new()
                .with_prompt(&question.message)
                .interact()
                .map_err(prompt_error)?
                .to_string(),
            PromptKind::List => {
                if question.choices.is_empty() {
                    return Err(Error::Prompt(format!(
                        "no choices available for '{}'",
                        question.name
                    )));
                }
                let index = Select::new()
                    .with_prompt(&question.message)
                    .items(&question.choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_error)?;
                question.choices[index].clone()
            }
        };

        Ok(answer)
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Prompt(err.to_string())
}

#[async_trait]
impl Prompter for DialoguerPrompter {
    async fn prompt(&self, question: Question) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::ask(question))
            .await
            .map_err(|e| Error::Prompt(format!("prompt task failed: {}", e)))?
    }
}

/// Answers questions from a fixed script, in order. Used where no terminal exists.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::sync::Mutex<std::collections::VecDeque<String>>,
    asked: std::sync::Mutex<Vec<Question>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<Question> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt(&self, question: Question) -> Result<String> {
        let name = question.name.clone();
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question);
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_prompter_answers_in_order() {
        let prompter = ScriptedPrompter::new(["page", "home"]);
        let first = prompter
            .prompt(Question {
                name: "generator".into(),
                message: "What would you like to generate?".into(),
                kind: PromptKind::List,
                choices: vec!["page".into(), "component".into()],
            })
            .await
            .unwrap();
        let second = prompter
            .prompt(Question {
                name: "name".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(first, "page");
        assert_eq!(second, "home");
        assert_eq!(prompter.asked().len(), 2);
        assert!(
            prompter
                .prompt(Question::default())
                .await
                .is_err()
        );
    }
}
