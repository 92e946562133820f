use crate::i18n::LanguageRegistry;
use crate::middleware::{Handler, LocalizedEvent};
use crate::telegram::ChatActions;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Bot commands answered in the chat's language.
///
/// Pack keys used: `start` for `/start`, `languages` as the header of the
/// `/languages` listing.
pub struct CommandHandler<A> {
    actions: Arc<A>,
    locales_dir: PathBuf,
}

impl<A: ChatActions> CommandHandler<A> {
    pub fn new(actions: Arc<A>, locales_dir: PathBuf) -> Self {
        Self {
            actions,
            locales_dir,
        }
    }

    fn languages_reply(&self, ctx: &LocalizedEvent) -> Result<String> {
        let header = pack_text(ctx, "languages")?;
        let supported = LanguageRegistry::get()
            .list_supported(&self.locales_dir)
            .with_context(|| format!("Failed to list {}", self.locales_dir.display()))?;

        let lines: Vec<String> = supported
            .iter()
            .map(|(code, name)| format!("{} - {}", code, name))
            .collect();
        Ok(format!("{}\n{}", header, lines.join("\n")))
    }
}

fn pack_text<'a>(ctx: &'a LocalizedEvent, key: &str) -> Result<&'a str> {
    ctx.lang()
        .text(key)
        .with_context(|| format!("Language pack has no '{}' text", key))
}

#[async_trait]
impl<A: ChatActions + 'static> Handler for CommandHandler<A> {
    type Output = ();

    async fn handle(&self, ctx: LocalizedEvent) -> Result<()> {
        let chat_id = ctx.chat().id;
        let Some(text) = ctx.text() else {
            return Ok(());
        };

        // Group commands arrive as /start@BotName
        let command = text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();

        let reply = match command {
            "/start" => pack_text(&ctx, "start")?.to_string(),
            "/languages" => self.languages_reply(&ctx)?,
            _ => {
                debug!("Ignoring non-command text in chat {}", chat_id);
                return Ok(());
            }
        };

        self.actions.send_message(chat_id, &reply).await
    }
}
