//! rowmap CLI
//!
//! Streams query results from the database at `DB_URL` as JSON lines, or
//! reports the affected-row count of a statement.
//!
//! Ctrl+C cancels a running query; rows already printed stay printed.

use clap::Parser;
use futures::StreamExt;
use rowmap::postgres::Config;
use rowmap::postgres::Postgres;
use rowmap::*;
use std::io::Write;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
enum Cli {
    #[command(about = "Stream query rows as JSON lines", alias = "q")]
    Query {
        #[arg(required = true)]
        sql: String,
        #[arg(short, long = "param", value_parser = param)]
        params: Vec<(String, String)>,
    },
    #[command(about = "Execute a statement and print the affected-row count", alias = "x")]
    Execute {
        #[arg(required = true)]
        sql: String,
        #[arg(short, long = "param", value_parser = param)]
        params: Vec<(String, String)>,
    },
}

fn param(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got {}", s))
}

fn command(sql: String, params: Vec<(String, String)>) -> Command {
    params
        .into_iter()
        .fold(Command::new(sql), |command, (k, v)| command.bind(&k, v))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let executor = Executor::new(Postgres::connect(&config).await?);
    match cli {
        Cli::Execute { sql, params } => {
            let n = executor.execute_count(command(sql, params)).await?;
            println!("{}", n);
        }
        Cli::Query { sql, params } => {
            let mut records = executor.stream_dynamic(command(sql, params))?;
            let cancel = records.canceller();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("interrupt received, cancelling query");
                    cancel.cancel();
                }
            });
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut count = 0usize;
            while let Some(record) = records.next().await {
                match record {
                    Ok(record) => {
                        serde_json::to_writer(&mut out, &record)?;
                        writeln!(out)?;
                        count += 1;
                    }
                    Err(Error::Cancelled) => {
                        log::warn!("query cancelled after {} rows", count);
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            out.flush()?;
            log::info!("streamed {} rows", count);
        }
    }
    Ok(())
}
