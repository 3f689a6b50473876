//! A small seeded world and action script for running the engine locally.

use chrono::Utc;
use mudmind_domain::{
    ActionEvent, ActionTarget, MonitoredAspect, Npc, Owner, Player, Profession, Questmaker, Race,
    Room, Skill,
};

use crate::infrastructure::memory::InMemoryWorld;

pub fn seed_world(world: &InMemoryWorld) {
    world.insert_room(
        Room::new("room_shire", "The Shire")
            .with_bias("magic", -0.2)
            .with_bias("attack", 0.1),
    );
    world.insert_room(Room::new("room_bree", "The Prancing Pony").with_bias("subterfuge", -0.3));

    world.insert_race(
        Race::new("hobbit", "Hobbit")
            .with_bias("magic", -0.3)
            .with_bias("subterfuge", 0.2),
    );
    world.insert_race(Race::new("elf", "Elf").with_bias("magic", 0.3));
    world.insert_profession(Profession::new("gardener", "Gardener").with_bias("gather_item", 0.2));
    world.insert_profession(Profession::new("wizard", "Wizard").with_bias("magic", 0.5));

    world.insert_npc(
        Npc::new("npc_gaffer", "Gaffer Gamgee", "room_shire", 15)
            .with_race("hobbit")
            .with_profession("gardener")
            .with_personality("A gruff old gardener, suspicious of strange folk and stranger magic."),
    );
    world.insert_npc(
        Npc::new("npc_barliman", "Barliman Butterbur", "room_bree", 12)
            .with_personality("The forgetful, talkative innkeeper of the Prancing Pony."),
    );

    world.insert_owner(
        Owner::new(
            "owner_shire",
            "Spirit of the Shire",
            MonitoredAspect::Location,
            "room_shire",
            25,
        )
        .with_budget(10.0, 100.0)
        .with_prompt_context("The slow, patient will of the Shire's green hills."),
    );
    world.insert_owner(
        Owner::new(
            "owner_wizards",
            "The Istari",
            MonitoredAspect::Profession,
            "wizard",
            40,
        )
        .with_budget(50.0, 100.0)
        .with_prompt_context("The order of wizards, watching every wielder of their art."),
    );

    world.insert_questmaker(
        Questmaker::new("qm_fate", "The Weaver of Fate", 30)
            .with_prompt_context("You spin quests from the deeds of adventurers."),
    );
}

/// Actions replayed by the binary: a few greetings, then some magic.
pub fn script() -> Vec<ActionEvent> {
    let wizard = Player::new("player_gandalf", "Gandalf", "room_shire")
        .with_profession("wizard");
    let fireworks = Skill::new("skill_fireworks", "Fireworks", "magic");
    let gaffer = ActionTarget::Entity("npc_gaffer".into());

    vec![
        ActionEvent::new(wizard.clone(), "say", Utc::now())
            .with_target(gaffer.clone())
            .with_metadata("speech", "Good morning!"),
        ActionEvent::new(wizard.clone(), "use_skill", Utc::now()).with_skill(fireworks.clone()),
        ActionEvent::new(wizard.clone(), "say", Utc::now())
            .with_target(gaffer)
            .with_metadata("speech", "What do you mean by good morning?"),
        ActionEvent::new(wizard, "cast_hostile_spell", Utc::now()).with_skill(fireworks),
    ]
}
