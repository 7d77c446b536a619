// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.

use crate::Persistence;
use crate::error::PersistenceError;
use crate::tests::{create_persistence, year};
use clinic_tariff::TariffStore;
use clinic_tariff_domain::{ComponentKind, ServiceComponent, ServiceId, TariffTier};
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_database_path() -> PathBuf {
    let id: u64 = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "clinic_tariff_test_{}_{id}.sqlite",
        std::process::id()
    ))
}

fn remove_database_files(path: &Path) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("sqlite-wal"));
    let _ = std::fs::remove_file(path.with_extension("sqlite-shm"));
}

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_key_enforcement_is_verified() {
    let persistence: Persistence = create_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let db1: Persistence = create_persistence();
    let db2: Persistence = create_persistence();

    db1.create_department("Radiology").unwrap();

    assert!(db1.find_department("Radiology").unwrap().is_some());
    assert!(db2.find_department("Radiology").unwrap().is_none());
}

#[test]
fn test_migrations_applied_on_initialization() {
    let persistence: Persistence = create_persistence();

    // Every table the store reads must exist
    assert_eq!(persistence.count_factors(year(1405)).unwrap(), 0);
    assert!(persistence.year_freeze(year(1405)).unwrap().is_none());
    assert!(persistence.get_audit_timeline(None).unwrap().is_empty());
}

#[test]
fn test_component_for_unknown_service_is_rejected() {
    let persistence: Persistence = create_persistence();

    let result = persistence.add_component(
        ServiceId::new(999).unwrap(),
        &ServiceComponent::new(ComponentKind::Technical, dec!(2)),
    );

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_file_database_persists_between_opens() {
    let path: PathBuf = temp_database_path();
    remove_database_files(&path);

    let service_id: ServiceId = {
        let persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        persistence
            .create_service("Consultation", TariffTier::Standard, &[], Some(dec!(250000)))
            .unwrap()
    };

    let reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    let service = reopened.find_service(service_id).unwrap().unwrap();
    assert_eq!(service.title(), "Consultation");
    assert_eq!(service.flat_price(), Some(dec!(250000)));

    drop(reopened);
    remove_database_files(&path);
}
