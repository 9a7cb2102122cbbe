//! Reactions on announcement pages toggling project roles.

mod common;

use std::sync::Arc;

use common::{BOT, FakeGuild, app_state, source_path, write_numbered_projects, write_projects};
use hackbot_core::Environment;
use hackbot_gateway::reactions::handle_event;
use hackbot_gateway::{CyclePlan, ReactionEvent, RoleChange, run_cycle};
use serenity::model::id::{MessageId, UserId};

const MEMBER: u64 = 77;

fn reaction(message: MessageId, user: u64, emoji: &str, added: bool) -> ReactionEvent {
    ReactionEvent {
        message,
        user: Some(UserId::new(user)),
        emoji: Some(emoji.to_string()),
        added,
    }
}

#[tokio::test]
async fn test_reaction_grants_and_revokes_role() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_path(&dir);
    write_numbered_projects(&source, 11);
    let guild = Arc::new(FakeGuild::with_utility_roles());
    let state = app_state(Arc::clone(&guild), &source, Environment::default());
    run_cycle(&state, CyclePlan::STARTUP).await.unwrap();

    let second_page = guild.pages()[1].id;
    let role = guild.role_id("proj-project-10").unwrap();

    let change = handle_event(&state, &reaction(second_page, MEMBER, "🐎", true))
        .await
        .unwrap();
    assert!(matches!(change, Some(RoleChange::Grant { ref project, .. }) if project == "project-10"));
    assert!(guild.has_member_role(MEMBER, role));

    handle_event(&state, &reaction(second_page, MEMBER, "🐎", false))
        .await
        .unwrap();
    assert!(!guild.has_member_role(MEMBER, role));
}

#[tokio::test]
async fn test_unbound_reactions_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_path(&dir);
    write_numbered_projects(&source, 3);
    let guild = Arc::new(FakeGuild::with_utility_roles());
    let state = app_state(Arc::clone(&guild), &source, Environment::default());
    run_cycle(&state, CyclePlan::STARTUP).await.unwrap();
    let page = guild.pages()[0].id;
    let role = guild.role_id("proj-project-0").unwrap();

    // Emoji not bound to any project.
    let change = handle_event(&state, &reaction(page, MEMBER, "🦄", true))
        .await
        .unwrap();
    assert_eq!(change, None);

    // The bot's own reactions.
    let change = handle_event(&state, &reaction(page, BOT, "🐁", true))
        .await
        .unwrap();
    assert_eq!(change, None);
    assert!(!guild.has_member_role(BOT, role));

    // Messages that are not pages.
    let change = handle_event(&state, &reaction(MessageId::new(1), MEMBER, "🐁", true))
        .await
        .unwrap();
    assert_eq!(change, None);
    assert!(!guild.has_member_role(MEMBER, role));
}

#[tokio::test]
async fn test_routing_catches_up_after_next_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_path(&dir);
    write_projects(&source, &[("alpha", "Alpha")]);
    let guild = Arc::new(FakeGuild::with_utility_roles());
    let state = app_state(Arc::clone(&guild), &source, Environment::default());
    run_cycle(&state, CyclePlan::STARTUP).await.unwrap();
    let page = guild.pages()[0].id;

    write_projects(&source, &[("alpha", "Alpha"), ("beta", "Beta")]);
    let event = reaction(page, MEMBER, "🐂", true);

    // Before the refresh the new emoji is not routed yet.
    assert_eq!(handle_event(&state, &event).await.unwrap(), None);

    run_cycle(&state, CyclePlan::REFRESH).await.unwrap();
    let change = handle_event(&state, &event).await.unwrap();
    assert!(matches!(change, Some(RoleChange::Grant { ref project, .. }) if project == "beta"));
    assert!(guild.has_member_role(MEMBER, guild.role_id("proj-beta").unwrap()));

    // Existing bindings survive the table swap.
    let change = handle_event(&state, &reaction(page, MEMBER, "🐁", true))
        .await
        .unwrap();
    assert!(matches!(change, Some(RoleChange::Grant { ref project, .. }) if project == "alpha"));
}

#[tokio::test]
async fn test_prepended_project_gets_its_own_emoji() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_path(&dir);
    write_projects(&source, &[("beta", "Beta"), ("alpha", "Alpha")]);
    let guild = Arc::new(FakeGuild::with_utility_roles());
    let state = app_state(Arc::clone(&guild), &source, Environment::default());
    run_cycle(&state, CyclePlan::STARTUP).await.unwrap();

    write_projects(
        &source,
        &[("gamma", "Gamma"), ("beta", "Beta"), ("alpha", "Alpha")],
    );
    run_cycle(&state, CyclePlan::REFRESH).await.unwrap();

    let page = guild.pages()[0].id;
    let registry = state.registry().await;
    let emoji: Vec<&str> = ["beta", "alpha", "gamma"]
        .iter()
        .map(|key| registry.get(key).unwrap().emoji)
        .collect();
    assert_eq!(
        emoji,
        vec![
            hackbot_core::emoji_for(0),
            hackbot_core::emoji_for(1),
            hackbot_core::emoji_for(2),
        ]
    );

    let mut on_page = guild.reactions_on(page);
    on_page.sort();
    let mut expected: Vec<String> = emoji.iter().map(|e| e.to_string()).collect();
    expected.sort();
    assert_eq!(on_page, expected);

    for key in ["alpha", "beta", "gamma"] {
        let bound = registry.get(key).unwrap().emoji;
        let change = handle_event(&state, &reaction(page, MEMBER, bound, true))
            .await
            .unwrap();
        assert!(
            matches!(change, Some(RoleChange::Grant { ref project, .. }) if project == key),
            "{bound} should route to {key}"
        );
        let role = guild.role_id(&format!("proj-{key}")).unwrap();
        assert!(guild.has_member_role(MEMBER, role));
    }
}
