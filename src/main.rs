#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    resgen::main().await
}
