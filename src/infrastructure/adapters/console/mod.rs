//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::{BotError, GatewayError};
use crate::application::services::EventService;
use crate::domain::entities::{InboundEvent, Language, Reply};
use crate::domain::traits::DeliveryGateway;

/// User id used for every console event
pub const CONSOLE_USER: &str = "console-user";

/// Console gateway - prints replies instead of calling the platform
#[derive(Debug, Default)]
pub struct ConsoleGateway;

impl ConsoleGateway {
    pub fn new() -> Self {
        Self
    }

    /// Render a reply the way it would look in the chat
    pub fn render(reply: &Reply) -> String {
        let mut out = format!("[BOT] {}", reply.text);
        if !reply.emojis.is_empty() {
            let indexes: Vec<String> = reply.emojis.iter().map(|e| e.index.to_string()).collect();
            out.push_str(&format!("\n  [Emoji at] {}", indexes.join(", ")));
        }
        if let Some(qr) = &reply.quick_reply {
            let labels: Vec<&str> = qr.items.iter().map(|i| i.label.as_str()).collect();
            out.push_str(&format!("\n  [Buttons] {}", labels.join(" | ")));
        }
        out
    }
}

#[async_trait]
impl DeliveryGateway for ConsoleGateway {
    async fn reply(&self, _reply_token: &str, reply: &Reply) -> Result<(), GatewayError> {
        println!("{}", Self::render(reply));
        Ok(())
    }

    async fn attach_rich_menu(&self, user_id: &str, language: Language) -> Result<(), GatewayError> {
        println!("[MENU] {} -> {} rich menu", user_id, language);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// What one console input line stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Event(InboundEvent),
    ShowState,
    Quit,
}

/// Map a console line onto a simulated platform event
pub fn parse_line(line: &str, reply_token: &str) -> ConsoleInput {
    match line {
        "/follow" => ConsoleInput::Event(InboundEvent::follow(CONSOLE_USER, reply_token)),
        "/unfollow" => ConsoleInput::Event(InboundEvent::unfollow(CONSOLE_USER)),
        "/state" => ConsoleInput::ShowState,
        "/quit" => ConsoleInput::Quit,
        text => ConsoleInput::Event(InboundEvent::text(CONSOLE_USER, reply_token, text)),
    }
}

/// Read events from stdin until `/quit` or EOF
pub async fn run(service: EventService) -> Result<(), BotError> {
    tracing::info!("Starting console bot (dev mode)");
    println!("Commands: /follow, /unfollow, /state, /quit. Anything else is sent as text.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut counter: u64 = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BotError::Internal(format!("stdin: {}", e)))?
    {
        // Message text is matched exactly, so only the line ending is stripped
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        counter += 1;

        match parse_line(line, &format!("console-{}", counter)) {
            ConsoleInput::Quit => break,
            ConsoleInput::ShowState => {
                match service.dispatcher().current_language(CONSOLE_USER).await {
                    Ok(language) => println!("[STATE] {}", language),
                    Err(e) => println!("[STATE] {}", e),
                }
            }
            ConsoleInput::Event(event) => {
                if !service.handle(event).await {
                    println!("[BOT] (no reply, see log)");
                }
            }
        }
    }
    Ok(())
}
