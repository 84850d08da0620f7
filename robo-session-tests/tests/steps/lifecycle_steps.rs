use cucumber::{then, when};
use robo_session_core::Vec2;
use robo_session_tests::ArenaWorld;

#[when(expr = "{string} starts the game")]
async fn starts_game(world: &mut ArenaWorld, name: String) {
    world
        .session_mut(&name)
        .start_game(Vec2::new(100.0, 300.0))
        .expect("start should succeed");
    world.pump();
}

#[when(expr = "{string} toggles pause")]
async fn toggles_pause(world: &mut ArenaWorld, name: String) {
    world
        .session_mut(&name)
        .toggle_pause()
        .expect("toggle should succeed");
    world.pump();
}

#[when(expr = "{int} ms pass")]
async fn time_passes(world: &mut ArenaWorld, ms: u64) {
    world.time.advance(ms);
    world.pump();
}

#[then("the game is paused for everyone")]
async fn paused_everywhere(world: &mut ArenaWorld) {
    for (name, session) in &world.sessions {
        assert!(session.lifecycle().is_paused(), "{} is not paused", name);
    }
}

#[then("the game is running for everyone")]
async fn running_everywhere(world: &mut ArenaWorld) {
    for (name, session) in &world.sessions {
        assert!(!session.lifecycle().is_paused(), "{} is paused", name);
        assert!(session.lifecycle().is_running(), "{} has no match", name);
    }
}

#[then(expr = "every participant has {int} ms of match time left")]
async fn time_left(world: &mut ArenaWorld, ms: u64) {
    for (name, session) in &world.sessions {
        assert_eq!(session.lifecycle().remaining_ms(), Some(ms), "at {}", name);
    }
}
