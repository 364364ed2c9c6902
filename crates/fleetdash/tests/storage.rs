//! On-disk storage tests.

use fleetdash::config::StorageConfig;
use fleetdash::model::{EntityKind, NewDevice};
use fleetdash::Storage;
use tempfile::TempDir;

fn on_disk(dir: &TempDir, seed: bool) -> StorageConfig {
    StorageConfig {
        database_path: dir.path().join("nested").join("fleet.db"),
        in_memory: false,
        seed_demo_data: seed,
    }
}

fn new_device(label: &str, imei: &str) -> NewDevice {
    serde_json::from_value(serde_json::json!({"label": label, "imei": imei})).unwrap()
}

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = on_disk(&dir, false);

    let id = {
        let storage = Storage::from_config(&config).unwrap();
        assert!(storage.is_empty().unwrap());
        storage
            .create_device(new_device("DEV-100", "490154203237518"))
            .unwrap()
            .id
    };

    let storage = Storage::from_config(&config).unwrap();
    let device = storage.get_device(id).unwrap().unwrap();
    assert_eq!(device.label, "DEV-100");
    assert_eq!(storage.recent_activity(10).unwrap().len(), 1);
    assert_eq!(storage.path(), config.database_path);
}

#[test]
fn seeding_happens_once() {
    let dir = TempDir::new().unwrap();
    let config = on_disk(&dir, true);

    {
        let storage = Storage::from_config(&config).unwrap();
        assert_eq!(storage.count(EntityKind::Device).unwrap(), 3);
        assert!(storage.delete_device(1).unwrap());
    }

    let storage = Storage::from_config(&config).unwrap();
    assert_eq!(storage.count(EntityKind::Device).unwrap(), 2);
    assert!(!storage.seed_demo_data().unwrap());
}

#[test]
fn uniqueness_holds_across_reopen() {
    let dir = TempDir::new().unwrap();
    let config = on_disk(&dir, false);

    {
        let storage = Storage::from_config(&config).unwrap();
        storage
            .create_device(new_device("DEV-100", "490154203237518"))
            .unwrap();
    }

    let storage = Storage::from_config(&config).unwrap();
    let err = storage
        .create_device(new_device("DEV-101", "490154203237518"))
        .unwrap_err();
    assert!(err.is_invalid_input());
}
