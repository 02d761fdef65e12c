/// Inline keyboard callback payloads
pub mod callback;
/// Anime card rendering
pub mod formatter;
/// Command, search and selection handlers
pub mod handlers;
/// Outbound messaging seam
pub mod transport;
/// Reply texts and keyboards
pub mod views;
