use clap::Parser;
use connect4::{
    init_logging, CliMover, Client, Host, HostConfig, InMemoryTransport, MatchRunner, MoveSource,
    PlayerId, TcpTransport,
};
use tokio::net::TcpListener;
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Host games for every client that connects.
    Serve {
        #[arg(long, default_value = "0.0.0.0:4444")]
        bind: String,
        #[arg(long, help = "Abandon a game after this many seconds without a move")]
        move_timeout: Option<u64>,
    },
    /// Connect to a host and play a hot-seat game on this terminal.
    Play {
        #[arg(long, default_value = "127.0.0.1:4444")]
        connect: String,
        #[arg(long, default_value_t = 1)]
        player: PlayerId,
        #[arg(long, default_value_t = 2)]
        opponent: PlayerId,
    },
    /// Play a hot-seat game against an in-process host.
    Local {
        #[arg(long, default_value_t = 1)]
        player: PlayerId,
        #[arg(long, default_value_t = 2)]
        opponent: PlayerId,
        #[arg(long, help = "Abandon a game after this many seconds without a move")]
        move_timeout: Option<u64>,
    },
}

fn host_config(move_timeout: Option<u64>) -> HostConfig {
    let config = HostConfig::from_env();
    match move_timeout {
        Some(secs) => config.with_move_timeout(Duration::from_secs(secs)),
        None => config,
    }
}

fn hot_seat() -> [Box<dyn MoveSource>; 2] {
    [Box::new(CliMover::stdio()), Box::new(CliMover::stdio())]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, move_timeout } => {
            let config = host_config(move_timeout);
            let listener = TcpListener::bind(&bind).await?;
            log::info!("listening on {} (move timeout {:?})", bind, config.move_timeout);
            loop {
                let (stream, addr) = listener.accept().await?;
                log::info!("client connected from {}", addr);
                tokio::spawn(async move {
                    let mut host = Host::new(TcpTransport::new(stream), config);
                    if let Err(e) = host.run().await {
                        log::warn!("host for {} ended with an error: {}", addr, e);
                    }
                });
            }
        }
        Commands::Play {
            connect,
            player,
            opponent,
        } => {
            let transport = TcpTransport::connect(&connect).await?;
            log::info!("connected to {}", connect);
            let mut runner = MatchRunner::new(Client::new(transport), hot_seat()).echo(true);
            runner.run(player, opponent).await?;
        }
        Commands::Local {
            player,
            opponent,
            move_timeout,
        } => {
            let (host_side, client_side) = InMemoryTransport::pair();
            let mut host = Host::new(host_side, host_config(move_timeout));
            let host_task = tokio::spawn(async move { host.run().await });

            let mut runner = MatchRunner::new(Client::new(client_side), hot_seat()).echo(true);
            let result = runner.run(player, opponent).await;
            drop(runner);
            host_task.await??;
            result?;
        }
    }
    Ok(())
}
