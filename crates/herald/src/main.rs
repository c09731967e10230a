use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    herald::run().await
}
