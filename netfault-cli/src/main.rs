// SPDX-License-Identifier: Apache-2.0

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod config;
mod fuzz;
mod replay;

use config::NetfaultConfig;
use fuzz::Fuzz;
use replay::Replay;

#[derive(Debug, StructOpt)]
#[structopt(name = "netfault", about = "Deterministic replay and fault injection for SDN control planes")]
enum Args {
    /// Replay a recorded event trace.
    Replay(Replay),
    /// Generate and replay a random input sequence.
    Fuzz(Fuzz),
}

fn main() {
    // The subcommand needs its config loaded before we know the log filter,
    // so install a reasonable default now and let each subcommand's own
    // config override it via `RUST_LOG`, matching how `netbench-driver`
    // leaves `RUST_LOG` as the ultimate authority.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(NetfaultConfig::default().log_filter)))
        .init();

    let args = Args::from_args();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to start the current-thread runtime");

    let result = runtime.block_on(async move {
        match args {
            Args::Replay(replay) => replay.run().await,
            Args::Fuzz(fuzz) => fuzz.run().await,
        }
    });

    if let Err(err) = result {
        tracing::error!(error = %err, "netfault exited with an error");
        std::process::exit(err.exit_code());
    }
}
