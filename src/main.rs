#[tokio::main]
async fn main() {
    if let Err(e) = meet_mesh_backend::run().await {
        eprintln!("meet-mesh-backend failed: {}", e);
        std::process::exit(1);
    }
}
