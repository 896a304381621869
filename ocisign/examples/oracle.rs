use ocisign::oracle;
use ocisign::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let bucket = std::env::var("OCI_BUCKET").unwrap_or_else(|_| "bucket".to_string());
    let object = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "objprefix/My File.exe".to_string());

    let client = oracle::default_client();
    println!("object storage host: {}", client.host().await?);

    let namespace = client.get_namespace().await?;
    match client.get_object(&namespace, &bucket, &object).await {
        Ok(content) => println!("downloaded {} bytes", content.len()),
        Err(err) if err.is_http_status() => {
            println!("server responded with {:?}", err.status());
            if let Some(body) = err.body() {
                println!("{}", String::from_utf8_lossy(body));
            }
        }
        Err(err) => return Err(err),
    }
    Ok(())
}
