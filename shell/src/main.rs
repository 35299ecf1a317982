use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    corvid_lib::run(corvid_lib::Args::parse()).await
}
