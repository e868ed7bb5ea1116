#[tokio::main]
async fn main() {
    if let Err(err) = viamentor_scheduling::run().await {
        eprintln!("server error: {err}");
        std::process::exit(1);
    }
}
