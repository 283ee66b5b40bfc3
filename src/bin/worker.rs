#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = qura_grading::run_worker().await {
        eprintln!("qura-worker fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
