use cucumber::{given, then, when};
use robo_session_core::Role;
use robo_session_p2p::SessionError;
use robo_session_tests::ArenaWorld;

// ===== Given Steps =====

#[given(expr = "a host named {string} has opened a session")]
async fn host_opened(world: &mut ArenaWorld, name: String) {
    world.open_host(&name).await;
}

#[given(expr = "a guest named {string} has joined")]
async fn guest_joined(world: &mut ArenaWorld, name: String) {
    world.join(&name).await.expect("guest should join");
}

#[given(expr = "guests {string} have joined")]
async fn guests_joined(world: &mut ArenaWorld, names: String) {
    for name in names.split(',').map(str::trim) {
        world.join(name).await.expect("guest should join");
    }
}

// ===== When Steps =====

#[when(expr = "a guest named {string} joins with the invite")]
async fn guest_joins(world: &mut ArenaWorld, name: String) {
    world.last_error = world.join(&name).await.err();
}

#[when(expr = "a guest named {string} tries to join")]
async fn guest_tries_to_join(world: &mut ArenaWorld, name: String) {
    world.last_error = world.join(&name).await.err();
    world.pump();
}

#[when(expr = "{string} leaves the session")]
async fn participant_leaves(world: &mut ArenaWorld, name: String) {
    world.leave(&name);
}

#[when(expr = "{string} renames themselves to {string}")]
async fn participant_renames(world: &mut ArenaWorld, name: String, new_name: String) {
    world
        .session_mut(&name)
        .set_display_name(new_name)
        .expect("rename should succeed");
    world.pump();
}

// ===== Then Steps =====

#[then("all participants are connected")]
async fn all_connected(world: &mut ArenaWorld) {
    assert!(world.last_error.is_none(), "unexpected error: {:?}", world.last_error);
    for (name, session) in &world.sessions {
        assert!(session.is_connected(), "{} is not connected", name);
    }
}

#[then(expr = "every roster lists {int} participant(s)")]
async fn roster_size(world: &mut ArenaWorld, count: usize) {
    for (name, session) in &world.sessions {
        assert_eq!(session.roster().len(), count, "roster of {}", name);
    }
}

#[then(expr = "{string} is the host in every roster")]
async fn is_host_everywhere(world: &mut ArenaWorld, name: String) {
    let id = world.id_of(&name);
    for (viewer, session) in &world.sessions {
        let entry = session.roster().get(&id).expect("host missing from roster");
        assert_eq!(entry.role(), Role::Host, "as seen by {}", viewer);
    }
}

#[then(expr = "{string} is a guest with color index {int} in every roster")]
async fn guest_color_everywhere(world: &mut ArenaWorld, name: String, color: usize) {
    let id = world.id_of(&name);
    for (viewer, session) in &world.sessions {
        let entry = session.roster().get(&id).expect("guest missing from roster");
        assert_eq!(entry.role(), Role::Guest, "as seen by {}", viewer);
        assert_eq!(entry.color_index(), color, "as seen by {}", viewer);
    }
}

#[then(expr = "every roster shows {string} as {string}")]
async fn roster_shows_name(world: &mut ArenaWorld, name: String, display: String) {
    let id = world.id_of(&name);
    for (viewer, session) in &world.sessions {
        let entry = session.roster().get(&id).expect("participant missing");
        assert_eq!(entry.display_name(), display, "as seen by {}", viewer);
    }
}

#[then(expr = "no roster contains {string}")]
async fn roster_lacks(world: &mut ArenaWorld, name: String) {
    for (viewer, session) in &world.sessions {
        assert!(
            session
                .roster()
                .participants()
                .iter()
                .all(|p| p.display_name() != name),
            "{} still listed by {}",
            name,
            viewer
        );
    }
}

#[then("the join fails because the room is full")]
async fn join_failed_room_full(world: &mut ArenaWorld) {
    let error = world.last_error.take();
    assert!(
        matches!(error, Some(SessionError::RoomFull)),
        "expected RoomFull, got {:?}",
        error
    );
}
