//! Photo record store over the SQLite key-value backend.

use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sl_core::photo::{Identity, PhotoRecord, SessionMetadata, WorldDescriptor};
use sl_core::ports::{KeyValueStorePort, PhotoRecordRepositoryPort};
use sl_infra::db::pool::init_db_pool;
use sl_infra::db::repositories::DieselKeyValueStore;
use sl_infra::db::DieselSqliteExecutor;
use sl_infra::metadata::{EmbeddedMetadata, EmbeddedMetadataReader, METADATA_FIELD};
use sl_infra::photo::PhotoRecordStore;
use sl_infra::SystemClock;

fn sqlite_store(db_path: &Path) -> Arc<DieselKeyValueStore<DieselSqliteExecutor>> {
    let pool = init_db_pool(db_path.to_str().unwrap()).unwrap();
    Arc::new(DieselKeyValueStore::new(
        DieselSqliteExecutor::new(pool),
        Arc::new(SystemClock),
    ))
}

fn png_with_description(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 1, 1);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .add_text_chunk(METADATA_FIELD.to_string(), text.to_string())
            .unwrap();
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0u8; 3]).unwrap();
    }
    out
}

#[tokio::test]
async fn kv_values_and_lists_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let kv = sqlite_store(&dir.path().join("kv.db"));

    assert_eq!(kv.get("missing").await.unwrap(), None);
    assert!(kv.get_list("missing").await.unwrap().is_empty());

    kv.set("a", b"one").await.unwrap();
    kv.set("a", b"two").await.unwrap();
    assert_eq!(kv.get("a").await.unwrap(), Some(b"two".to_vec()));

    kv.set_list("l", &["x".to_string(), "y".to_string()]).await.unwrap();
    assert_eq!(kv.get_list("l").await.unwrap(), vec!["x", "y"]);

    kv.remove("a").await.unwrap();
    assert_eq!(kv.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn records_persist_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("records.db");

    let mut record = PhotoRecord::new(
        "VRChat_2024-03-01_20-15-00.000_1920x1080.png",
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 15, 0).unwrap(),
    )
    .with_local_path("/photos/VRChat_2024-03-01_20-15-00.000_1920x1080.png");
    record.world = Some(WorldDescriptor::new("The Great Pug", "wrld_pug"));
    record.players = vec![Identity::new("usr_1", "Alice")].into();

    {
        let store = PhotoRecordStore::new(sqlite_store(&db_path), Arc::new(EmbeddedMetadataReader::new()));
        store.upsert(record.clone()).await.unwrap();
    }

    let reopened = PhotoRecordStore::new(sqlite_store(&db_path), Arc::new(EmbeddedMetadataReader::new()));
    let found = reopened
        .lookup(Path::new("/photos/VRChat_2024-03-01_20-15-00.000_1920x1080.png"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, record);
    assert_eq!(reopened.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_file_is_recovered_from_embedded_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionMetadata {
        world: Some(WorldDescriptor::new("Midnight Rooftop", "wrld_roof")),
        players: vec![Identity::new("usr_2", "Bob")].into(),
    };
    let payload = EmbeddedMetadata::from_session(&session, Some(Identity::new("usr_me", "Me")))
        .to_json()
        .unwrap();
    let photo = dir.path().join("VRChat_2024-03-01_21-00-00.000_1920x1080.png");
    std::fs::write(&photo, png_with_description(&payload)).unwrap();

    let store = PhotoRecordStore::new(
        sqlite_store(&dir.path().join("records.db")),
        Arc::new(EmbeddedMetadataReader::new()),
    );
    let found = store.lookup(&photo).await.unwrap().unwrap();

    assert_eq!(found.world.as_ref().unwrap().id, "wrld_roof");
    assert!(found.players.contains("usr_2"));
    assert!(found.players.contains("usr_me"));
    assert_eq!(found.local_path.as_deref(), Some(photo.as_path()));
    assert_eq!(store.list().await.unwrap().len(), 1);
}
