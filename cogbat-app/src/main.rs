mod app;
mod cli;
mod config;
mod history;
mod render;
mod simulate;
mod sink;

fn main() -> anyhow::Result<()> {
    cli::run_from_env()
}
