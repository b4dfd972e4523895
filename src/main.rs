use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minio_connector::{ConnectorOptions, MinioConnector, StorageError};

const BUCKET: &str = "grupo-10";
const FILE_PATH: &str = "./Grupo 10/Documento_grupo_10.pdf";

/// Scripted demo run / 演示流程
async fn run(connector: &mut MinioConnector) -> Result<(), StorageError> {
    connector.connect().await?;
    println!("Storage client ready.");

    connector.create_bucket(BUCKET).await?;
    connector.upload_file(BUCKET, FILE_PATH, None).await?;
    connector.list_buckets().await?;
    connector.list_files(BUCKET).await?;

    // Other operations / 其他操作
    // connector.download_file(BUCKET, "Documento_grupo_10.pdf", "./downloads/Documento_grupo_10.pdf").await?;
    // connector.generate_presigned_url(BUCKET, "Documento_grupo_10.pdf", minio_connector::DEFAULT_EXPIRATION_HOURS).await?;
    // connector.get_file_metadata(BUCKET, "Documento_grupo_10.pdf").await?;
    // connector.delete_file(BUCKET, "Documento_grupo_10.pdf").await?;
    // connector.delete_bucket(BUCKET).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minio_connector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    // Load .env if present (missing file is fine) / 加载 .env 文件
    let _ = dotenvy::dotenv();

    let mut connector = MinioConnector::new(ConnectorOptions::default());
    if let Err(e) = run(&mut connector).await {
        println!("Storage operation failed: {}", e);
    }

    Ok(())
}
