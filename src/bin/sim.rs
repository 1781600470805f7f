use connect4::{
    init_logging, Client, Host, HostConfig, InMemoryTransport, MatchRunner, MoveSource,
    RandomMover, Status,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <seed>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;

    let (host_side, client_side) = InMemoryTransport::pair();
    let mut host = Host::new(host_side, HostConfig::default());
    let host_task = tokio::spawn(async move { host.run().await });

    let seats: [Box<dyn MoveSource>; 2] = [
        Box::new(RandomMover::seeded(seed)),
        Box::new(RandomMover::seeded(seed.wrapping_add(1))),
    ];
    let mut runner = MatchRunner::new(Client::new(client_side), seats);
    let report = runner.run(1, 2).await?;
    drop(runner);
    host_task.await??;

    let (status, winner) = match report.snapshot.status {
        Status::Won(p) => ("won", Some(p)),
        Status::Draw => ("draw", None),
        Status::Abandoned => ("abandoned", None),
        Status::InProgress => ("in_progress", None),
    };
    let result = json!({
        "session": report.session,
        "status": status,
        "winner": winner,
        "moves": report.snapshot.move_count,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
