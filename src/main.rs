use anyhow::Context;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    surat_massal_server::run()
        .await
        .context("server terminated abnormally")
}
