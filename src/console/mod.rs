//! Line-oriented console front end
//!
//! Reads one line at a time, hands it to the [`ChatController`] or the
//! gateway, then prints whatever changed in the conversation state since the
//! last refresh.

mod commands;
mod render;

pub use commands::{parse_input, ConsoleInput, SlashCommand};
pub use render::{render_message, short_time};

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::debug;

use crate::conversation::{ChatController, SAMPLE_PROMPTS};
use crate::gateway::ChatGateway;
use crate::{MindfulError, Result};

/// Passages requested by `/search`
const SEARCH_RESULTS: usize = 3;

pub struct Console<W: Write> {
    controller: ChatController,
    gateway: Arc<dyn ChatGateway>,
    online: Option<watch::Receiver<bool>>,
    out: W,
    /// Number of conversation messages already printed
    printed: usize,
    last_error: Option<String>,
    crisis_shown: bool,
    was_online: bool,
}

impl<W: Write> Console<W> {
    pub fn new(controller: ChatController, gateway: Arc<dyn ChatGateway>, out: W) -> Self {
        Self {
            controller,
            gateway,
            online: None,
            out,
            printed: 0,
            last_error: None,
            crisis_shown: false,
            was_online: true,
        }
    }

    /// Show an offline banner whenever the flag drops to `false`.
    pub fn with_online_flag(mut self, online: watch::Receiver<bool>) -> Self {
        self.online = Some(online);
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read lines until EOF or `/quit`.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(
            self.out,
            "Mental Health Support Chat - type /help for commands"
        )?;
        self.refresh().await?;

        let mut lines = input.lines();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            match self.handle(parse_input(&line)).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(MindfulError::Gateway(e)) => {
                    writeln!(self.out, "! Request failed: {e}")?;
                }
                Err(e) => return Err(e),
            }
            self.refresh().await?;
        }

        writeln!(self.out, "Take care of yourself.")?;
        Ok(())
    }

    /// Apply one input. Returns `false` when the console should exit.
    async fn handle(&mut self, input: ConsoleInput) -> Result<bool> {
        debug!("Console input: {:?}", input);

        match input {
            ConsoleInput::Message(text) => self.send(&text).await?,
            ConsoleInput::Sample(n) => {
                // Numbers only pick prompts while the prompts are on screen
                if self.controller.state().await.shows_sample_prompts() {
                    self.send(SAMPLE_PROMPTS[n - 1]).await?;
                } else {
                    self.send(&n.to_string()).await?;
                }
            }
            ConsoleInput::Clear => {
                if self.controller.state().await.can_clear() {
                    // Failures surface through the state's error notice
                    let _ = self.controller.clear_chat().await;
                } else {
                    writeln!(self.out, "Nothing to clear.")?;
                }
            }
            ConsoleInput::Dismiss => {
                self.controller.dismiss_error().await;
                self.last_error = None;
            }
            ConsoleInput::CloseCrisis => {
                self.controller.close_crisis_mode().await;
                self.crisis_shown = false;
            }
            ConsoleInput::Resources => {
                let bundle = self.gateway.resources().await?;
                writeln!(self.out, "{}", render::render_resources(&bundle))?;
            }
            ConsoleInput::Search(query) => {
                let results = self.gateway.search(&query, SEARCH_RESULTS).await?;
                writeln!(self.out, "{}", render::render_search(&results))?;
            }
            ConsoleInput::Feedback { rating, comment } => {
                let ack = self
                    .gateway
                    .submit_feedback(rating, &comment, self.controller.session_id())
                    .await?;
                writeln!(
                    self.out,
                    "{}",
                    ack.message.as_deref().unwrap_or("Feedback sent.")
                )?;
            }
            ConsoleInput::Session => {
                writeln!(self.out, "Session: {}", self.controller.session_id())?;
            }
            ConsoleInput::Help => self.print_help()?,
            ConsoleInput::Quit => return Ok(false),
            ConsoleInput::Invalid(reason) => writeln!(self.out, "{reason}")?,
        }

        Ok(true)
    }

    /// Send one turn, echoing it while the reply is outstanding.
    async fn send(&mut self, text: &str) -> Result<()> {
        let controller = self.controller.clone();
        // `join` polls the send first, so the user turn is already in the
        // log when the echo runs.
        let (_, echoed) = futures::future::join(controller.send_message(text), async {
            self.refresh().await?;
            if controller.is_loading() {
                writeln!(self.out, "  Assistant is typing...")?;
                self.out.flush()?;
            }
            Ok::<_, MindfulError>(())
        })
        .await;
        // Rejections and failures are recorded in the conversation state
        echoed
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "Type a message to talk with the assistant.")?;
        for command in SlashCommand::all() {
            let usage = match command.usage() {
                "" => command.to_string(),
                usage => usage.to_string(),
            };
            writeln!(self.out, "  {:<28}{}", usage, command.description())?;
        }
        Ok(())
    }

    /// Print everything that changed since the previous refresh.
    async fn refresh(&mut self) -> Result<()> {
        let online = self.online.as_ref().map(|rx| *rx.borrow()).unwrap_or(true);
        if online != self.was_online {
            if online {
                writeln!(self.out, "-- Back online --")?;
            } else {
                writeln!(
                    self.out,
                    "-- Offline: the assistant service is unreachable --"
                )?;
            }
            self.was_online = online;
        }

        let state = self.controller.state().await;

        if state.messages.len() < self.printed {
            writeln!(self.out, "-- conversation cleared --")?;
            self.printed = 0;
        }
        let welcome_printed_now = self.printed == 0;
        for message in &state.messages[self.printed..] {
            writeln!(self.out, "{}", render_message(message))?;
        }
        self.printed = state.messages.len();

        if state.error != self.last_error {
            if let Some(error) = &state.error {
                writeln!(self.out, "! {error} (/dismiss to hide)")?;
            }
            self.last_error = state.error.clone();
        }

        if state.is_crisis_mode && !self.crisis_shown {
            writeln!(self.out, "{}", render::render_crisis_panel())?;
        }
        self.crisis_shown = state.is_crisis_mode;

        if welcome_printed_now && state.shows_sample_prompts() {
            writeln!(self.out, "{}", render::render_sample_prompts())?;
        }

        Ok(())
    }
}
