use crate::application::simulation::{Drone, Walker};
use crate::infrastructure::error::Result;
use robo_session_core::{
    ManualTimeSource, ParticipantId, ReplicationConfig, Role, Vec2, CAPACITY,
};
use robo_session_p2p::infrastructure::MemoryConnectionFactory;
use robo_session_p2p::{
    MemoryNetwork, MemorySessionManager, RoomCodeSignaling, SessionConfig, SessionManager,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Parameters of an in-process session run
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Clamped to the free slots next to the host
    pub guests: usize,
    /// Match length in simulated time
    pub duration: Duration,
    pub frame: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            guests: 2,
            duration: Duration::from_secs(10),
            frame: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RosterLine {
    pub name: String,
    pub role: Role,
    pub color_index: usize,
}

/// What the host and first guest ended up seeing
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub roster: Vec<RosterLine>,
    pub frames: u64,
    /// Messages delivered to the first guest
    pub guest_messages: usize,
    /// Enemies replicated on the first guest
    pub guest_enemies: usize,
    pub ranking: Vec<(ParticipantId, u32)>,
    pub game_ended: bool,
}

fn pump(sessions: &mut [MemorySessionManager]) {
    for _ in 0..16 {
        let handled: usize = sessions.iter_mut().map(|s| s.poll()).sum();
        if handled == 0 {
            break;
        }
    }
}

/// Run a whole match between a host and guests on an in-memory network,
/// with simulated time.
pub async fn run_demo(options: DemoOptions) -> Result<DemoReport> {
    let network = MemoryNetwork::new();
    let time = ManualTimeSource::new();
    let guests = options.guests.clamp(1, CAPACITY - 1);

    let config = SessionConfig::new("memory://")
        .with_poll_interval(1)
        .with_replication(ReplicationConfig::default().with_game_duration(options.duration));

    let build = |name: &str| {
        let config = config.clone().with_display_name(name);
        let signaling = RoomCodeSignaling::new(
            MemoryConnectionFactory::new(network.clone()),
            config.signalling_server.clone(),
            config.ice_servers.clone(),
        );
        SessionManager::with_time_source(signaling, config, Arc::new(time.clone()))
    };

    let mut host = build("Host");
    let invite = host.init_as_host().await?;
    tracing::info!("🎮 Demo host ready, invite {}", invite);

    let mut sessions = vec![host];
    for i in 0..guests {
        let mut guest = build(&format!("Robot {}", i + 1));
        guest.join_as_guest(&invite).await?;
        sessions[0].poll();
        guest.await_handshake().await?;
        sessions.push(guest);
        pump(&mut sessions);
    }

    let delivered = Rc::new(Cell::new(0usize));
    let counter = delivered.clone();
    sessions[1].on_message(move |_| counter.set(counter.get() + 1));

    let spawn = Vec2::new(100.0, 300.0);
    sessions[0].start_game(spawn)?;
    pump(&mut sessions);

    let mut walkers: Vec<Walker> = (0..sessions.len())
        .map(|i| Walker::new(Vec2::new(spawn.x + 40.0 * i as f32, spawn.y), 120.0, 300.0))
        .collect();
    let mut drones: Vec<Drone> = (0..3)
        .map(|i| Drone::new(format!("drone-{i}"), Vec2::new(400.0, 150.0 + 60.0 * i as f32), 80.0))
        .collect();

    let frame_ms = options.frame.as_millis().max(1) as u64;
    let frames = options.duration.as_millis() as u64 / frame_ms + 1;

    for _ in 0..frames {
        time.advance(frame_ms);

        for drone in &mut drones {
            drone.step(options.frame);
        }
        let enemies: Vec<_> = drones.iter().map(Drone::state).collect();
        sessions[0].publish_enemies(options.frame, &enemies)?;

        for (session, walker) in sessions.iter_mut().zip(walkers.iter_mut()) {
            walker.step(options.frame);
            session.publish_player(options.frame, walker.state())?;
            session.tick_lifecycle()?;
        }

        pump(&mut sessions);
    }

    let host = &sessions[0];
    let report = DemoReport {
        roster: host
            .roster()
            .participants()
            .into_iter()
            .map(|p| RosterLine {
                name: p.display_name().to_string(),
                role: p.role(),
                color_index: p.color_index(),
            })
            .collect(),
        frames,
        guest_messages: delivered.get(),
        guest_enemies: sessions[1].replicas().enemies().len(),
        ranking: host.lifecycle().scoreboard().ranking(),
        game_ended: host.lifecycle().has_ended(),
    };

    for session in &mut sessions {
        session.close();
    }

    Ok(report)
}
