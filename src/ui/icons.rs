//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Run indicators
pub static RUNNING: Emoji<'_, '_> = Emoji("▶️  ", "[>]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "[#]");
pub static TROPHY: Emoji<'_, '_> = Emoji("🏆 ", "[*]");
pub static SHUFFLE: Emoji<'_, '_> = Emoji("🔀 ", "[~]");
