#[tokio::main]
async fn main() {
    convo_backend::run().await;
}
