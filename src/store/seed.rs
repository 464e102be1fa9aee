//! Bundled seed data for the database-setup flow.

use crate::models::{CreateMemberRequest, CreateRuleRequest, MemberRole};

pub fn seed_members() -> Vec<CreateMemberRequest> {
    vec![
        member(
            "LordKing",
            MemberRole::Owner,
            "lordking#1234",
            "Founder and owner of LordSMP. Building epic worlds since 2013.",
        ),
        member(
            "DragonSlayer",
            MemberRole::Leader,
            "dragonslayer#5678",
            "Building coordinator and community manager. In charge of castle builds.",
        ),
        member(
            "RedstoneWizard",
            MemberRole::Leader,
            "redstonewiz#9012",
            "Redstone expert and technical advisor. Creates all the cool contraptions.",
        ),
        member(
            "MasterBuilder",
            MemberRole::Member,
            "masterbuilder#3456",
            "Expert builder specializing in medieval architecture.",
        ),
        member(
            "ExplorerJane",
            MemberRole::Member,
            "explorer_jane#2468",
            "Has mapped more of the world than anyone else.",
        ),
    ]
}

pub fn seed_rules() -> Vec<CreateRuleRequest> {
    vec![
        rule(
            "No Griefing",
            "Destroying or modifying another player's build without permission is strictly prohibited. This includes stealing items, breaking blocks, or vandalizing structures.",
            "Behavior",
            true,
        ),
        rule(
            "Be Respectful",
            "Treat all players with respect. No harassment, discrimination, or offensive language in chat or voice communications.",
            "Behavior",
            true,
        ),
        rule(
            "No Cheating or Hacking",
            "Use of any mods, hacks, or exploits that provide an unfair advantage is not allowed. This includes X-ray texture packs, fly hacks, speed hacks, etc.",
            "Technical",
            true,
        ),
        rule(
            "Maintain Distance Between Bases",
            "Keep at least 200 blocks between major bases to respect others' space and prevent overcrowding.",
            "Building",
            false,
        ),
        rule(
            "No Spamming or Excessive Lag",
            "Avoid creating lag-inducing mechanisms or farms. No redstone clocks without proper on/off switches. Server performance affects everyone.",
            "Technical",
            true,
        ),
        rule(
            "Discord Membership Required",
            "All players must join the Discord server for important announcements and community communication.",
            "Community",
            true,
        ),
    ]
}

fn member(
    name: &str,
    role: MemberRole,
    discord: &str,
    description: &str,
) -> CreateMemberRequest {
    CreateMemberRequest {
        name: name.to_string(),
        role,
        profile_image: Some(format!("https://mc-heads.net/avatar/{}", name)),
        discord_username: Some(discord.to_string()),
        description: Some(description.to_string()),
    }
}

fn rule(title: &str, description: &str, category: &str, important: bool) -> CreateRuleRequest {
    CreateRuleRequest {
        title: title.to_string(),
        description: description.to_string(),
        category: Some(category.to_string()),
        important,
    }
}
