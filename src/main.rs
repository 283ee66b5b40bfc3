#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = qura_grading::run().await {
        eprintln!("qura-grading fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
