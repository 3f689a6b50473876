//! Default prompt assembly for reactions.

use std::fmt::Write;

use mudmind_domain::{PerceivedActionRecord, Player, SentientEntity};

use crate::infrastructure::ports::{PromptAssembler, PromptError};

/// Describes the entity, what it remembers about the player and every
/// buffered perception, then asks it to respond.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionSummaryPrompt;

impl PromptAssembler for ActionSummaryPrompt {
    fn assemble(
        &self,
        entity: &SentientEntity,
        player: &Player,
        records: &[PerceivedActionRecord],
    ) -> Result<String, PromptError> {
        if records.is_empty() {
            return Err(PromptError::NoActions);
        }

        render(entity, player, records).map_err(|e| PromptError::Assembly(e.to_string()))
    }
}

fn render(
    entity: &SentientEntity,
    player: &Player,
    records: &[PerceivedActionRecord],
) -> Result<String, std::fmt::Error> {
    let mut prompt = String::new();

    writeln!(prompt, "You are {} ({}).", entity.name(), entity.kind())?;
    let personality = entity.prompt_context().trim();
    if !personality.is_empty() {
        writeln!(prompt, "Your personality: {personality}")?;
    }
    prompt.push('\n');

    let memories = entity.memories_about(&player.id);
    if !memories.is_empty() {
        writeln!(prompt, "Your memories about {}:", player.name)?;
        for memory in memories {
            writeln!(prompt, "- {memory}")?;
        }
        prompt.push('\n');
    }

    writeln!(prompt, "Recent perceived actions by {}:", player.name)?;
    for record in records {
        let action = &record.perceived_action;
        write!(
            prompt,
            "- {} (clarity {:.2}, apparent skill {}, significance {:.2}",
            action.perceived_action_type,
            action.clarity,
            action.apparent_skill_level,
            record.significance
        )?;
        if action.is_criminal {
            prompt.push_str(", criminal");
        }
        writeln!(prompt, ")")?;
    }
    prompt.push('\n');

    writeln!(
        prompt,
        "Player {} performed these actions. Respond to this.",
        player.name
    )?;

    Ok(prompt)
}
