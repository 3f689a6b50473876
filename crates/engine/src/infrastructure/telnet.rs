//! ANSI rendering for telnet-style clients.

use crate::infrastructure::ports::{NarrativeRenderer, SemanticColor, SemanticMessage};

const RESET: &str = "\x1b[0m";

#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiRenderer;

impl AnsiRenderer {
    fn color_code(color: SemanticColor) -> &'static str {
        match color {
            SemanticColor::Default => "\x1b[37m",
            SemanticColor::Highlight => "\x1b[33m",
            SemanticColor::Error => "\x1b[31m",
            SemanticColor::Narrative => "\x1b[32m",
            SemanticColor::Npc => "\x1b[36m",
            SemanticColor::Owner => "\x1b[95m",
            SemanticColor::Quest => "\x1b[94m",
        }
    }
}

impl NarrativeRenderer for AnsiRenderer {
    fn render(&self, message: &SemanticMessage) -> String {
        format!(
            "{}{}{RESET}\r\n",
            Self::color_code(message.color),
            message.content
        )
    }
}
