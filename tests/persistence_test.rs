//! Recovery behavior: records and identity assignment survive reopening
//! each persistent backend.

mod common;

use common::payment;
use payments_service::domain::payment::PaymentStatus;
use payments_service::domain::ports::PaymentRepository;
use payments_service::infrastructure::rocksdb::RocksDBPaymentRepository;
use payments_service::infrastructure::sqlite::SqlitePaymentRepository;
use rust_decimal_macros::dec;
use tempfile::tempdir;

#[tokio::test]
async fn test_sqlite_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("payments.db");

    {
        let repository = SqlitePaymentRepository::open(&db_path).unwrap();
        repository.create(payment(1, dec!(100.00))).await.unwrap();
    }

    let repository = SqlitePaymentRepository::open(&db_path).unwrap();
    let recovered = repository.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(recovered.amount, dec!(100.00));
    assert_eq!(recovered.status, PaymentStatus::Pending);

    // The rowid sequence continues past the recovered record.
    let next = repository.create(payment(2, dec!(50.00))).await.unwrap();
    assert_eq!(next.id, 2);
}

#[tokio::test]
async fn test_rocksdb_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("payments_docs");

    {
        let repository = RocksDBPaymentRepository::open(&db_path).unwrap();
        repository.create(payment(1, dec!(100.00))).await.unwrap();
    }

    let repository = RocksDBPaymentRepository::open(&db_path).unwrap();
    let recovered = repository.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(recovered.amount, dec!(100.00));

    // Identity is read back from the stored maximum, not from memory.
    let next = repository.create(payment(2, dec!(50.00))).await.unwrap();
    assert_eq!(next.id, 2);
}
