use clap::{Parser, Subcommand};
use robo_session_cli::application::{Drone, Walker};
use robo_session_cli::{run_demo, CliError, DemoOptions, LogConfig, Result};
use robo_session_core::{NetworkMessage, Roster, Vec2};
use robo_session_p2p::{
    ConnectionStatus, InviteToken, ManualSessionManager, MatchboxSessionManager, SessionConfig,
    SessionManager, SessionState, SignalingExchange,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

const DEFAULT_SERVER: &str = "ws://localhost:3536";

#[derive(Parser)]
#[command(name = "robo-cli")]
#[command(version, about = "Robo Arena CLI - P2P session testing harness")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct NetworkArgs {
    /// Matchbox signalling server URL
    #[arg(short = 's', long, default_value = DEFAULT_SERVER)]
    server: String,

    /// TURN server URL (optional, format: turn:host:port)
    #[arg(long)]
    turn_server: Option<String>,

    /// TURN username (required if turn-server is set)
    #[arg(long)]
    turn_username: Option<String>,

    /// TURN credential (required if turn-server is set)
    #[arg(long)]
    turn_credential: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a session and wait for guests
    Host {
        #[command(flatten)]
        network: NetworkArgs,

        /// Host display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Copy-paste offer/answer instead of a room code
        #[arg(long)]
        manual: bool,

        /// Print the invite as a link on this base URL
        #[arg(long)]
        link_base: Option<String>,

        /// Simulate enemies and an avatar once a guest is in
        #[arg(long)]
        simulate: bool,
    },

    /// Join a session from an invite (room code, link or offer blob)
    Join {
        #[command(flatten)]
        network: NetworkArgs,

        /// Invite to join
        #[arg(short = 'i', long)]
        invite: String,

        /// Guest display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// The invite is a manual offer blob
        #[arg(long)]
        manual: bool,

        /// Simulate an avatar once connected
        #[arg(long)]
        simulate: bool,
    },

    /// Play a match between in-process peers with simulated time
    Demo {
        /// Number of guests (1-3)
        #[arg(short, long, default_value_t = 2)]
        guests: usize,

        /// Match length in seconds
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
    },

    /// Print the JSON schema of the wire message envelope
    Schema {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    if cli.json {
        logging = logging.with_json();
    }
    logging.init()?;

    match cli.command {
        Commands::Host {
            network,
            name,
            manual,
            link_base,
            simulate,
        } => {
            let config = build_config(&network, name)?;
            if manual {
                host(ManualSessionManager::manual(config), true, None, simulate).await?;
            } else {
                host(
                    MatchboxSessionManager::matchbox(config),
                    false,
                    link_base,
                    simulate,
                )
                .await?;
            }
        }
        Commands::Join {
            network,
            invite,
            name,
            manual,
            simulate,
        } => {
            let config = build_config(&network, name)?;
            if manual {
                join(ManualSessionManager::manual(config), &invite, simulate).await?;
            } else {
                join(MatchboxSessionManager::matchbox(config), &invite, simulate).await?;
            }
        }
        Commands::Demo { guests, seconds } => {
            let report = run_demo(DemoOptions {
                guests,
                duration: Duration::from_secs(seconds),
                ..Default::default()
            })
            .await?;

            println!("Roster:");
            for line in &report.roster {
                println!("  [{}] {} ({})", line.color_index, line.name, line.role);
            }
            println!("Frames simulated: {}", report.frames);
            println!("Messages seen by first guest: {}", report.guest_messages);
            println!("Enemies replicated on first guest: {}", report.guest_enemies);
            println!("Game ended: {}", report.game_ended);
            println!("Ranking:");
            for (id, score) in &report.ranking {
                println!("  {score:>6}  {id}");
            }
        }
        Commands::Schema { output } => {
            let schema = serde_json::to_string_pretty(&NetworkMessage::wire_schema())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, schema)?;
                    info!("📝 Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }

    Ok(())
}

fn build_config(network: &NetworkArgs, name: Option<String>) -> Result<SessionConfig> {
    let mut config = SessionConfig::new(network.server.clone());

    if let Some(turn_url) = network.turn_server.clone() {
        match (network.turn_username.clone(), network.turn_credential.clone()) {
            (Some(username), Some(credential)) => {
                info!("Using TURN server: {}", turn_url);
                config = config.with_turn_server(turn_url, username, credential);
            }
            _ => {
                return Err(CliError::InvalidConfig(
                    "TURN server requires both username and credential".to_string(),
                ));
            }
        }
    }

    if let Some(name) = name {
        config = config.with_display_name(name);
    }

    Ok(config)
}

fn log_session_events<S: SignalingExchange>(session: &mut SessionManager<S>) {
    session.on_status_change(|status| match status {
        ConnectionStatus::Error => warn!("📶 Status: {}", status),
        _ => info!("📶 Status: {}", status),
    });
    session.on_roster_change(print_roster);
    session.on_message(|msg| tracing::debug!("📥 {} from {}", msg.kind(), msg.sender_id()));
}

fn print_roster(roster: &Roster) {
    info!("👥 Roster ({} / 4):", roster.len());
    for p in roster.participants() {
        info!("   [{}] {} ({}, {})", p.color_index(), p.display_name(), p.role(), p.id());
    }
}

/// Read answer blobs from stdin, one per line
fn spawn_answer_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn host<S: SignalingExchange>(
    mut session: SessionManager<S>,
    manual: bool,
    link_base: Option<String>,
    simulate: bool,
) -> Result<()> {
    log_session_events(&mut session);

    info!("Connecting to signalling server: {}", session.config().signalling_server);
    let invite = session.init_as_host().await?;

    info!("✓ Session created");
    if manual {
        println!("Offer (send to every guest):\n{invite}\n");
        println!("Paste each guest's answer on its own line.");
    } else {
        println!("Room code: {invite}");
        if let Some(base) = link_base {
            let token: InviteToken = invite
                .parse()
                .map_err(|e| CliError::InvalidConfig(format!("{e}")))?;
            let link = token.to_link(&url::Url::parse(&base)?);
            println!("Invite link: {link}");
        }
        println!("Join with: robo-cli join --invite {invite}");
    }
    info!("Waiting for guests... Press Ctrl+C to exit");

    let mut answers = if manual {
        Some(spawn_answer_reader())
    } else {
        None
    };

    run_loop(&mut session, simulate, |session| {
        if let Some(rx) = answers.as_mut() {
            while let Ok(answer) = rx.try_recv() {
                match session.apply_answer(&answer) {
                    Ok(()) => info!("🔑 Answer accepted"),
                    Err(e) => warn!("⚠️ Answer rejected: {}", e),
                }
            }
        }
    })
    .await
}

async fn join<S: SignalingExchange>(
    mut session: SessionManager<S>,
    invite: &str,
    simulate: bool,
) -> Result<()> {
    log_session_events(&mut session);

    info!("Joining session...");
    let answer = session.join_as_guest(invite).await?;
    if !answer.is_empty() {
        println!("Answer (send back to the host):\n{answer}\n");
    }

    info!("Waiting for the host to let us in...");
    session.await_handshake().await?;
    info!("✓ Connected");

    run_loop(&mut session, simulate, |_| {}).await
}

async fn run_loop<S: SignalingExchange>(
    session: &mut SessionManager<S>,
    simulate: bool,
    mut on_tick: impl FnMut(&mut SessionManager<S>),
) -> Result<()> {
    let frame = Duration::from_millis(16);
    let mut interval = tokio::time::interval(frame);
    let mut walker = Walker::new(Vec2::new(100.0, 300.0), 120.0, 300.0);
    let mut drone = Drone::new("drone-0", Vec2::new(400.0, 200.0), 80.0);
    let mut started = false;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                on_tick(session);
                session.poll();

                if session.state() == SessionState::Closed {
                    warn!("🔴 Session closed");
                    break;
                }

                if simulate && session.state() == SessionState::Active {
                    if session.is_host() {
                        if !started {
                            session.start_game(Vec2::new(100.0, 300.0))?;
                            started = true;
                        }
                        drone.step(frame);
                        session.publish_enemies(frame, &[drone.state()])?;
                    }
                    walker.step(frame);
                    session.publish_player(frame, walker.state())?;
                    if session.tick_lifecycle()? {
                        info!("🏁 Match over");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("");
                info!("Shutting down...");
                break;
            }
        }
    }

    session.close();
    Ok(())
}
