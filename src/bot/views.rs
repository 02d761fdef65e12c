//! UI components
//!
//! Fixed reply texts and the inline selection keyboard.

use super::callback::CallbackPayload;
use crate::catalog::SearchResult;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// ─────────────────────────────────────────────────────────────────────────────
// Reply texts
// ─────────────────────────────────────────────────────────────────────────────

/// Reply to `/start`
pub const START_TEXT: &str = "Привет! Я аниме-бот 🤖\n\n\
    Я могу найти информацию об аниме по названию.\n\
    Просто напиши название аниме, которое хочешь найти!\n\n\
    Например: Naruto, Attack on Titan, One Piece и т.д.";

/// Reply to `/help`, HTML
pub const HELP_TEXT: &str = "🤖 <b>Аниме-бот Помощь</b>\n\n\
    Просто напишите название аниме, и я найду информацию о нём!\n\n\
    Примеры запросов:\n\
    - Naruto\n\
    - Attack on Titan\n\
    - One Piece\n\
    - My Hero Academia\n\n\
    Команда /random покажет случайное аниме.\n\n\
    Я покажу вам описание, рейтинг, год выпуска и ссылку на MyAnimeList!";

/// Query shorter than the minimum length
pub const QUERY_TOO_SHORT: &str = "Пожалуйста, введите название аниме длиннее 2 символов.";
/// Acknowledgement sent before the catalog search
pub const SEARCHING: &str = "🔍 Ищу аниме...";
/// Search returned no results
pub const NOTHING_FOUND: &str = "Ничего не найдено 😢 Попробуйте другое название.";
/// Catalog search failed
pub const SEARCH_FAILED: &str =
    "Сервис поиска аниме сейчас недоступен 😢 Пожалуйста, попробуйте позже.";
/// Prompt above the selection keyboard
pub const CHOOSE_ANIME: &str = "Вот что я нашёл. Выберите аниме:";
/// Detail fetch failed
pub const DETAILS_FAILED: &str = "Не удалось получить информацию об аниме 😢";
/// Random fetch failed
pub const RANDOM_FAILED: &str = "Не удалось получить случайное аниме 😢";
/// Callback carried a malformed id
pub const INVALID_ID: &str = "Некорректный идентификатор аниме.";
/// Both photo and text delivery failed
pub const DELIVERY_FAILED: &str =
    "Не удалось отправить информацию об аниме. Пожалуйста, попробуйте позже.";
/// Generic apology from the error boundary
pub const GENERIC_ERROR: &str =
    "Произошла ошибка при обработке вашего запроса. Пожалуйста, попробуйте позже.";

// ─────────────────────────────────────────────────────────────────────────────
// Selection keyboard
// ─────────────────────────────────────────────────────────────────────────────

/// One button of the selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Button text
    pub label: String,
    /// Action sent back when pressed
    pub payload: CallbackPayload,
}

impl Choice {
    /// Build a choice for a search result, labelled `"<title> (<year>)"`
    ///
    /// # Examples
    ///
    /// ```
    /// use anime_lookup_bot::bot::views::Choice;
    /// use anime_lookup_bot::catalog::SearchResult;
    ///
    /// let result = SearchResult { id: 1, title: "Cowboy Bebop".into(), year: None };
    /// assert_eq!(Choice::from_result(&result).label, "Cowboy Bebop (N/A)");
    /// ```
    #[must_use]
    pub fn from_result(result: &SearchResult) -> Self {
        let year = result
            .year
            .map_or_else(|| super::formatter::PLACEHOLDER.to_string(), |y| y.to_string());
        Self {
            label: format!("{} ({year})", result.title),
            payload: CallbackPayload::SelectAnime(result.id),
        }
    }
}

/// Create the selection keyboard, one button per row
#[must_use]
pub fn selection_keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = choices
        .iter()
        .map(|choice| {
            vec![InlineKeyboardButton::callback(
                choice.label.clone(),
                choice.payload.to_string(),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}
