use cucumber::{then, when};
use robo_session_core::{MessageKind, MessagePayload, Vec2};
use robo_session_tests::ArenaWorld;

#[when(expr = "{string} fires a shot")]
async fn fires_shot(world: &mut ArenaWorld, name: String) {
    world
        .session_mut(&name)
        .send(MessagePayload::PlayerShot(ArenaWorld::sample_shot()))
        .expect("send should succeed");
    world.pump();
}

#[when(expr = "{string} sends a game start")]
async fn sends_game_start(world: &mut ArenaWorld, name: String) {
    world
        .session_mut(&name)
        .send(MessagePayload::GameStart { spawn: Vec2::ZERO })
        .expect("send should succeed");
    world.pump();
}

#[then(regex = r#"^"([^"]+)" receives exactly (\d+) "([A-Z_]+)" messages?$"#)]
async fn receives_exactly(world: &mut ArenaWorld, name: String, count: usize, kind: String) {
    let kind = MessageKind::from_wire_name(&kind)
        .unwrap_or_else(|| panic!("unknown message type {}", kind));
    assert_eq!(world.received(&name, kind), count, "{} messages at {}", kind, name);
}
