#[tokio::main]
async fn main() -> anyhow::Result<()> {
    temario_backend::run().await
}
