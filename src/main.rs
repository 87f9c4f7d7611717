#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vms_controller_lib::run().await
}
