use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    transport::in_memory::InMemoryTransport, Bot, ClientNode, ClientOutcome, Difficulty, Hub, MemoryStats,
    PlayerIdentity, ServerConfig,
};
use serde_json::json;

/// Bot against bot through an in-process server; prints a JSON summary.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <seed> <difficulty-a> <difficulty-b>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let diff_a: Difficulty = args[2].parse().map_err(|e| anyhow::anyhow!("{}", e))?;
    let diff_b: Difficulty = args[3].parse().map_err(|e| anyhow::anyhow!("{}", e))?;

    let (hub, handle) = Hub::new(&ServerConfig::default(), Box::new(MemoryStats::new()));
    let hub_task = tokio::spawn(hub.run());

    let mut rng_a = SmallRng::seed_from_u64(seed);
    let mut rng_b = SmallRng::seed_from_u64(seed.wrapping_add(1));
    let ta = InMemoryTransport::connect(&handle)?;
    let tb = InMemoryTransport::connect(&handle)?;
    drop(handle);

    let fa = async move {
        let mut node = ClientNode::new(PlayerIdentity::new("a", "player_a"), Bot::new(diff_a), Box::new(ta));
        node.run(&mut rng_a).await
    };
    let fb = async move {
        let mut node = ClientNode::new(PlayerIdentity::new("b", "player_b"), Bot::new(diff_b), Box::new(tb));
        node.run(&mut rng_b).await
    };
    let (a, b) = tokio::try_join!(fa, fb)?;

    // both nodes are dropped, so the hub drains and stops
    let manager = hub_task.await?;
    let leaderboard: Vec<_> = manager
        .stats()
        .top_players(2)
        .into_iter()
        .map(|r| json!({"id": r.id.0, "wins": r.wins, "losses": r.losses, "shots": r.shots, "hits": r.hits}))
        .collect();

    let summary = |o: &ClientOutcome, d: Difficulty| {
        json!({"difficulty": d.to_string(), "result": format!("{:?}", o.result), "shots": o.shots, "hits": o.hits})
    };
    let result = json!({
        "player_a": summary(&a, diff_a),
        "player_b": summary(&b, diff_b),
        "leaderboard": leaderboard,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
