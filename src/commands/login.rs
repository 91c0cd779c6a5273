use async_trait::async_trait;

use crate::Result;
use crate::command::{
    Command, CommandContext, CommandMetadata, InputSpec, ParsedOptions, PromptSpec, Validator,
};

pub struct LoginCommand {
    metadata: CommandMetadata,
}

impl LoginCommand {
    pub fn new() -> Self {
        Self {
            metadata: CommandMetadata::new("login", "Login with your Ionic ID")
                .input(
                    InputSpec::new("email", "Your email address")
                        .required()
                        .validator(Validator::Email)
                        .prompt(PromptSpec::input("Email:")),
                )
                .input(
                    InputSpec::new("password", "Your password")
                        .required()
                        .prompt(PromptSpec::password("Password:"))
                        .private(),
                )
                .example("ionic login john@example.com"),
        }
    }
}

impl Default for LoginCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for LoginCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        let [email, password, ..] = inputs else {
            return Ok(Some(1));
        };
        cx.env.session().login(email, password).await?;
        println!("You are logged in!");
        Ok(None)
    }
}
