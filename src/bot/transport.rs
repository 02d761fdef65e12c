//! Outbound messaging seam.
//!
//! Handlers talk to [`ChatTransport`] only; [`TelegramTransport`] is the
//! teloxide implementation.

use super::views::{selection_keyboard, Choice};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, LinkPreviewOptions, ParseMode};

/// Everything the conversation handlers can send
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Plain text message
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// HTML message with link previews disabled
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;

    /// Photo by URL with an HTML caption
    async fn send_photo(&self, chat_id: ChatId, photo_url: &str, caption_html: &str)
        -> Result<()>;

    /// Photo by URL without a caption
    async fn send_cover(&self, chat_id: ChatId, photo_url: &str) -> Result<()>;

    /// Prompt followed by an inline keyboard of choices
    async fn send_choices(&self, chat_id: ChatId, prompt: &str, choices: &[Choice]) -> Result<()>;
}

/// Telegram-backed transport
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wrap a bot instance.
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// HTML message request with link previews turned off
    fn html_message(&self, chat_id: ChatId, html: &str) -> <Bot as Requester>::SendMessage {
        self.bot
            .send_message(chat_id, html)
            .parse_mode(ParseMode::Html)
            .link_preview_options(previews_disabled())
    }
}

fn parse_photo_url(photo_url: &str) -> Result<Url> {
    Url::parse(photo_url).map_err(|e| anyhow!("Invalid photo URL: {e}"))
}

const fn previews_disabled() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.html_message(chat_id, html).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption_html: &str,
    ) -> Result<()> {
        let url = parse_photo_url(photo_url)?;
        self.bot
            .send_photo(chat_id, InputFile::url(url))
            .caption(caption_html)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn send_cover(&self, chat_id: ChatId, photo_url: &str) -> Result<()> {
        let url = parse_photo_url(photo_url)?;
        self.bot.send_photo(chat_id, InputFile::url(url)).await?;
        Ok(())
    }

    async fn send_choices(&self, chat_id: ChatId, prompt: &str, choices: &[Choice]) -> Result<()> {
        self.bot
            .send_message(chat_id, prompt)
            .reply_markup(selection_keyboard(choices))
            .await?;
        Ok(())
    }
}
