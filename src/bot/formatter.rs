//! Anime card rendering
//!
//! Turns an [`AnimeDetail`] into Telegram HTML and decides whether the cover
//! image may be attached.

use crate::catalog::AnimeDetail;
use crate::config::CATALOG_PAGE_URL;
use crate::utils::{strip_markup, truncate_str};
use std::fmt::Write;

/// Rendered in place of any absent field
pub const PLACEHOLDER: &str = "N/A";
/// Maximum synopsis length in characters
pub const SYNOPSIS_LIMIT: usize = 1000;
/// Appended to a cut synopsis
pub const TRUNCATION_MARKER: &str = "...";
/// Rendered when the record has no synopsis
pub const NO_SYNOPSIS: &str = "Описание отсутствует";
/// Telegram's limit on photo captions, in visible characters
pub const CAPTION_LIMIT: usize = 1024;
/// Replaces the synopsis of mature titles
pub const MATURE_NOTICE: &str = "Описание скрыто: тайтл содержит контент для взрослых (18+).";

/// Card ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDetail {
    /// HTML message body or photo caption
    pub text: String,
    /// Whether to send as a photo with caption
    pub attach_image: bool,
    /// Cover URL, set only when `attach_image` is true
    pub image_url: Option<String>,
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PLACEHOLDER.to_string(), escape)
}

/// Scores keep at least one decimal, so 8 reads as `8.0` and 8.75 stays `8.75`.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}

fn value_or_placeholder<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Strips markup and cuts the synopsis to [`SYNOPSIS_LIMIT`] characters.
///
/// The result is plain text; HTML escaping happens in [`render_detail`].
///
/// # Examples
///
/// ```
/// use anime_lookup_bot::bot::formatter::synopsis_excerpt;
/// assert_eq!(synopsis_excerpt("A <i>short</i> plot."), "A short plot.");
/// ```
#[must_use]
pub fn synopsis_excerpt(raw: &str) -> String {
    let stripped = strip_markup(raw);
    if stripped.chars().count() > SYNOPSIS_LIMIT {
        format!(
            "{}{TRUNCATION_MARKER}",
            truncate_str(&stripped, SYNOPSIS_LIMIT)
        )
    } else {
        stripped
    }
}

/// Render an anime card.
///
/// Mature titles get [`MATURE_NOTICE`] instead of the synopsis and never
/// carry an image.
#[must_use]
pub fn render_detail(detail: &AnimeDetail, is_mature: bool) -> RenderedDetail {
    let mut text = String::new();

    let _ = write!(
        text,
        "🎌 <b>{}</b>\n\n",
        text_or_placeholder(Some(detail.title.as_str()))
    );

    if let Some(native) = detail
        .title_native
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        let _ = write!(text, "🇯🇵 <i>{}</i>\n\n", escape(native));
    }

    let score = detail.score.map(format_score);
    let _ = writeln!(
        text,
        "📺 <b>Тип:</b> {}",
        text_or_placeholder(detail.kind.as_deref())
    );
    let _ = writeln!(text, "📅 <b>Год:</b> {}", value_or_placeholder(detail.year));
    let _ = writeln!(
        text,
        "📊 <b>Эпизоды:</b> {}",
        value_or_placeholder(detail.episode_count)
    );
    let _ = writeln!(text, "⭐ <b>Рейтинг:</b> {}/10", value_or_placeholder(score));
    let _ = write!(
        text,
        "👥 <b>Статус:</b> {}\n\n",
        text_or_placeholder(detail.status.as_deref())
    );

    if is_mature {
        let _ = write!(text, "🔞 <b>Описание:</b>\n<i>{MATURE_NOTICE}</i>\n\n");
    } else {
        let synopsis = detail
            .synopsis
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| NO_SYNOPSIS.to_string(), |s| escape(&synopsis_excerpt(s)));
        let _ = write!(text, "📖 <b>Описание:</b>\n{synopsis}\n\n");
    }

    let _ = write!(
        text,
        "🔗 <b>Ссылка на MyAnimeList:</b>\n{CATALOG_PAGE_URL}/{}",
        detail.id
    );

    let image_url = if is_mature {
        None
    } else {
        detail
            .cover_image_url
            .clone()
            .filter(|url| !url.trim().is_empty())
    };

    RenderedDetail {
        text,
        attach_image: image_url.is_some(),
        image_url,
    }
}

impl RenderedDetail {
    /// Number of characters Telegram counts for this card once the HTML is
    /// parsed.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        html_escape::decode_html_entities(&strip_markup(&self.text))
            .chars()
            .count()
    }

    /// Whether the card can go out as a photo caption.
    #[must_use]
    pub fn fits_caption(&self) -> bool {
        self.visible_len() <= CAPTION_LIMIT
    }
}
