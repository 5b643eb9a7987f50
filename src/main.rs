#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use seabattle::{
    init_logging, pacing::spawn_local_match, pacing::LocalEvent, serve_tcp, transport::tcp::ClientTcpTransport,
    Board, Bot, ClientConfig, ClientNode, ClientResult, Difficulty, Hub, LocalMatch, MatchMode, MemoryStats,
    PlacementPolicy, PlayerIdentity, RoomId, ServerConfig, Turn, DEFAULT_BIND,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::io::{AsyncBufReadExt, BufReader};
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum ModeArg {
    Random,
    Friend,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

#[cfg(feature = "std")]
impl From<DifficultyArg> for Difficulty {
    fn from(d: DifficultyArg) -> Self {
        match d {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the match server until Ctrl-C.
    Serve {
        #[arg(long, env = "SEABATTLE_BIND", default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, help = "Accept submitted boards without checking the fleet layout")]
        trust_placements: bool,
    },
    /// Connect to a server and let a bot play one match.
    Client {
        #[arg(long, default_value = "127.0.0.1:3000")]
        connect: String,
        #[arg(long, default_value = "Bot")]
        name: String,
        #[arg(long, help = "Player id; random when omitted")]
        id: Option<String>,
        #[arg(long, value_enum, default_value_t = ModeArg::Random)]
        mode: ModeArg,
        #[arg(long, help = "Room token to join (friend mode)")]
        room: Option<String>,
        #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
        difficulty: DifficultyArg,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play against the computer in this terminal.
    Local {
        #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
        difficulty: DifficultyArg,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, trust_placements } => {
            let config = ServerConfig {
                bind,
                placement_policy: if trust_placements {
                    PlacementPolicy::Trust
                } else {
                    PlacementPolicy::Validate
                },
                ..ServerConfig::default()
            };
            serve(config).await?;
        }
        Commands::Client {
            connect,
            name,
            id,
            mode,
            room,
            difficulty,
            seed,
        } => {
            let defaults = ClientConfig::default();
            let config = ClientConfig {
                connect,
                id: id.unwrap_or(defaults.id),
                name,
                mode: match mode {
                    ModeArg::Random => MatchMode::Random,
                    ModeArg::Friend => MatchMode::Friend,
                },
                room: room.map(RoomId),
                difficulty: difficulty.into(),
            };
            run_client(config, make_rng(seed)).await?;
        }
        Commands::Local { difficulty, seed } => {
            run_local(difficulty.into(), make_rng(seed)).await?;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    println!("Listening on {}", listener.local_addr()?);
    let (hub, handle) = Hub::new(&config, Box::new(MemoryStats::new()));
    let hub_task = tokio::spawn(hub.run());

    tokio::select! {
        res = serve_tcp(listener, handle, &config) => res?,
        _ = tokio::signal::ctrl_c() => println!("Shutting down..."),
    }

    // connection tasks still hold hub handles
    hub_task.abort();
    Ok(())
}

#[cfg(feature = "std")]
async fn run_client(config: ClientConfig, mut rng: SmallRng) -> anyhow::Result<()> {
    println!("Connecting to {}...", config.connect);
    let transport = ClientTcpTransport::connect(&config.connect).await?;
    println!("Connected successfully!");

    let (room_tx, room_rx) = tokio::sync::oneshot::channel();
    let mut node = ClientNode::new(
        PlayerIdentity::new(config.id, config.name),
        Bot::new(config.difficulty),
        Box::new(transport),
    )
    .on_room_created(room_tx);
    if config.mode == MatchMode::Friend {
        node = node.friend(config.room);
    }
    tokio::spawn(async move {
        if let Ok(room) = room_rx.await {
            println!("Room created. Share this token with your friend: {}", room);
        }
    });

    let outcome = node.run(&mut rng).await?;
    match outcome.result {
        ClientResult::Won => println!("Victory! All enemy ships sunk."),
        ClientResult::Lost => println!("Defeat. Your fleet was sunk."),
        ClientResult::OpponentLeft => println!("Opponent left the match; you win by forfeit."),
    }
    println!("Shots fired: {}, hits: {}", outcome.shots, outcome.hits);
    println!("\nYour board:\n{}\n\nEnemy board:\n{}", node.own_board(), node.target_view());
    Ok(())
}

#[cfg(feature = "std")]
async fn run_local(difficulty: Difficulty, mut rng: SmallRng) -> anyhow::Result<()> {
    let game = LocalMatch::new(&mut rng, difficulty).map_err(|e| anyhow::anyhow!(e))?;
    println!("Playing against a {} bot. Enter shots like B7, or 'quit'.", difficulty);
    print_boards(game.human_board(), &game.target_view());

    let (handle, mut events, task) = spawn_local_match(game, rng, Default::default());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                None => {
                    handle.quit();
                    break;
                }
                Some(l) if l.trim().eq_ignore_ascii_case("quit") => {
                    handle.quit();
                    break;
                }
                Some(l) => match Board::parse_coord(&l) {
                    Some((row, col)) => handle.shoot(row, col)?,
                    None => println!("Invalid coordinate '{}'. Use a letter A-J and a row 1-10.", l.trim()),
                },
            },
            event = events.recv() => match event {
                Some(LocalEvent::Shot { report, human_board, target_view }) => {
                    let who = match report.shooter {
                        Turn::Human => "You",
                        Turn::Bot => "Bot",
                    };
                    let what = if report.outcome.sunk {
                        "sunk a ship"
                    } else if report.outcome.hit {
                        "hit"
                    } else {
                        "missed"
                    };
                    println!(
                        "{} fired at {}{}: {}",
                        who,
                        (b'A' + report.col as u8) as char,
                        report.row + 1,
                        what
                    );
                    print_boards(&human_board, &target_view);
                }
                Some(LocalEvent::Rejected { row, col }) => {
                    println!("Can't shoot {}{} now.", (b'A' + col as u8) as char, row + 1);
                }
                Some(LocalEvent::Finished { winner }) => {
                    match winner {
                        Turn::Human => println!("Victory! You have sunk all enemy ships!"),
                        Turn::Bot => println!("Defeat. The bot sank your fleet."),
                    }
                    break;
                }
                None => break,
            },
        }
    }

    let game = task.await?;
    let (shots, hits) = game.stats(Turn::Human);
    println!("You fired {} shots with {} hits.", shots, hits);
    Ok(())
}

#[cfg(feature = "std")]
fn print_boards(own: &Board, target: &Board) {
    println!("\nYour fleet:\n{}\n\nEnemy waters:\n{}\n", own, target);
}
