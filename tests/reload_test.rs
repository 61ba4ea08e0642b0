use anyhow::Result;
use customer_lookup::config::toml_config::TomlConfig;
use customer_lookup::{CsvSource, Field, LookupError, LookupServer, RecordSource, SnapshotStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str =
    "contract_code;phone_number;activation_date;platform;status;average_arpu;service_type";

fn write_table(dir: &TempDir, rows: &[&str]) -> Result<std::path::PathBuf> {
    let path = dir.path().join("customers.csv");
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

#[tokio::test]
async fn test_reload_picks_up_new_file_contents() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(&dir, &["1;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV"])?;

    let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(&path, b';'));
    let store = SnapshotStore::load(source).await?;
    assert_eq!(store.current().find_by_phone("3331234567").unwrap().status, "ATTIVO");

    write_table(&dir, &["1;3331234567;2021-01-01T15:38:01Z;Q BLACK;CESSATO;50;TV"])?;
    store.reload().await?;
    assert_eq!(store.current().find_by_phone("3331234567").unwrap().status, "CESSATO");
    Ok(())
}

#[tokio::test]
async fn test_broken_file_on_reload_keeps_serving_old_data() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(&dir, &["1;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV"])?;

    let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(&path, b';'));
    let store = SnapshotStore::load(source).await?;

    std::fs::write(&path, "contract_code;phone_number\n1;3331234567\n")?;
    let err = store.reload().await.unwrap_err();
    assert!(matches!(err, LookupError::MissingColumns { .. }));

    std::fs::remove_file(&path)?;
    assert!(matches!(store.reload().await, Err(LookupError::DataSource { .. })));

    assert!(store.current().find_by_phone("3331234567").is_some());
    Ok(())
}

#[tokio::test]
async fn test_periodic_reload() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(&dir, &["1;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV"])?;

    let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(&path, b';'));
    let store = Arc::new(SnapshotStore::load(source).await?);
    let handle = Arc::clone(&store).spawn_periodic_reload(Duration::from_millis(50));

    write_table(
        &dir,
        &[
            "1;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV",
            "2;3339999999;2022-01-01T00:00:00Z;Q PLUS;ATTIVO;20;BB",
        ],
    )?;

    let mut reloaded = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if store.current().len() == 2 {
            reloaded = true;
            break;
        }
    }
    handle.abort();

    assert!(reloaded, "snapshot was not reloaded");
    Ok(())
}

#[tokio::test]
async fn test_server_from_toml_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(&dir, &["1;3331234567;2021-01-01T15:38:01Z;Q BLACK;ATTIVO;50;TV"])?;

    let toml_content = format!(
        "[source]\npath = \"{}\"\n\n[lookup]\ndefault_fields = [\"status\", \"platform\"]\n",
        path.display().to_string().replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml_content)?;

    let server = LookupServer::from_config(&config).await?;
    assert_eq!(
        server.service().default_fields().to_vec(),
        vec![Field::Status, Field::Platform]
    );

    let projection = server.service().find_by_phone("333 123 4567", None)?;
    assert_eq!(projection.get(Field::Status), Some("ATTIVO"));
    assert_eq!(projection.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_server_startup_fails_without_data_file() {
    let config = TomlConfig::from_toml_str("[source]\npath = \"/nonexistent/customers.csv\"\n")
        .unwrap();
    assert!(LookupServer::from_config(&config).await.is_err());
}
