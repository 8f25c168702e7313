#[tokio::main]
async fn main() {
    let code = handoff::app::startup::startup().await;
    std::process::exit(code);
}
