use exchange_engine::retry::{retry_transient, RetryPolicy};
use exchange_engine::settings::Settings;
use exchange_engine::shock::mock::FixedShock;
use exchange_engine::store::{FileStore, MemoryStore, Snapshot, Store, TradeCommit};
use exchange_engine::Engine;
use market::{Account, ExchangeError, Stock, StoreError, Symbol};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Memory store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    down: AtomicBool,
}

impl FlakyStore {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store is down".into()))
        } else {
            Ok(())
        }
    }
}

impl Store for FlakyStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        self.inner.load()
    }

    fn persist_stock(&self, stock: &Stock) -> Result<(), StoreError> {
        self.check()?;
        self.inner.persist_stock(stock)
    }

    fn persist_account(&self, account: &Account) -> Result<(), StoreError> {
        self.check()?;
        self.inner.persist_account(account)
    }

    fn persist_trade(&self, commit: &TradeCommit<'_>) -> Result<(), StoreError> {
        self.check()?;
        self.inner.persist_trade(commit)
    }
}

fn catalog() -> Vec<Stock> {
    vec![
        Stock::new(Symbol::parse("ABC").unwrap(), "Abc Corp", "technology", 100.0, 1.0, 0.0)
            .unwrap(),
    ]
}

fn open(store: Arc<dyn Store>) -> Engine {
    Engine::with_catalog(
        Settings::default(),
        store,
        Box::new(FixedShock::none()),
        catalog(),
    )
    .unwrap()
}

#[test]
fn test_file_store_restores_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");

    let (user, worth) = {
        let engine = open(Arc::new(FileStore::open(&path).unwrap()));
        let user = engine.open_account("ada").unwrap().user_id();
        engine.buy(user, "ABC", 10).unwrap();
        engine.sell(user, "ABC", 4).unwrap();
        engine.ingest_sector_interest("technology", 20.0).unwrap();
        (user, engine.net_worth(user).unwrap())
    };

    let engine = open(Arc::new(FileStore::open(&path).unwrap()));
    let account = engine.account(user).unwrap();
    assert_eq!(account.username(), "ada");
    assert_eq!(account.positions().quantity(&Symbol::parse("ABC").unwrap()), 6);
    assert_eq!(engine.transactions(None).len(), 2);
    assert!((engine.net_worth(user).unwrap() - worth).abs() < 1e-6);
    // 100 + 1.0 - 0.4 + 20 * 0.01
    assert!((engine.quote("ABC").unwrap().price() - 100.8).abs() < 1e-6);

    let receipt = engine.buy(user, "ABC", 1).unwrap();
    assert_eq!(receipt.transaction.sequence(), 3);
}

#[test]
fn test_failed_write_leaves_state_untouched() {
    let store = Arc::new(FlakyStore::default());
    let engine = open(store.clone());
    let user = engine.open_account("ada").unwrap().user_id();

    store.set_down(true);
    let err = engine.buy(user, "ABC", 5).unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, ExchangeError::TransientStore(_)));

    assert_eq!(engine.balance(user).unwrap(), 10_000.0);
    assert!(engine.account(user).unwrap().positions().is_empty());
    assert!(engine.transactions(None).is_empty());
    assert_eq!(engine.quote("ABC").unwrap().price(), 100.0);

    assert!(engine.ingest_sector_interest("technology", 50.0).is_err());
    assert_eq!(engine.quote("ABC").unwrap().price(), 100.0);
    assert!(engine.open_account("bob").is_err());
    assert!(engine.open_account("bob").unwrap_err().is_retryable());

    store.set_down(false);
    let receipt = engine.buy(user, "ABC", 5).unwrap();
    assert!((receipt.transaction.price() - 100.0).abs() < 1e-6);
    assert!(engine.open_account("bob").is_ok());
}

#[test]
fn test_retry_recovers_from_transient_outage() {
    let store = Arc::new(FlakyStore::default());
    let engine = open(store.clone());
    let user = engine.open_account("ada").unwrap().user_id();

    store.set_down(true);
    let mut attempts = 0;
    let receipt = retry_transient(RetryPolicy::fixed(Duration::ZERO, 3), || {
        attempts += 1;
        if attempts == 2 {
            store.set_down(false);
        }
        engine.buy(user, "ABC", 1)
    })
    .unwrap();

    assert_eq!(attempts, 2);
    assert_eq!(receipt.transaction.sequence(), 2);
    assert_eq!(engine.transactions(Some(user)).len(), 1);
}

#[test]
fn test_corrupt_records_are_rejected_on_open() {
    let mut snapshot = Snapshot::default();
    snapshot.stocks = catalog();
    snapshot.stocks.extend(catalog());

    let result = Engine::with_catalog(
        Settings::default(),
        Arc::new(MemoryStore::with_snapshot(snapshot)),
        Box::new(FixedShock::none()),
        Vec::new(),
    );
    assert!(matches!(
        result,
        Err(ExchangeError::TransientStore(StoreError::Malformed(_)))
    ));
}
