// Layout: page geometry, font metrics and the structured page composer.
// Everything here is pure and synchronous; callers that lay out on the async
// path wrap it in tokio::task::spawn_blocking.

pub mod engine;
pub mod font_metrics;
pub mod page;
