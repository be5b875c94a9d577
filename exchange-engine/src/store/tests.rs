use super::*;
use market::{Side, Symbol};

fn stock(symbol: &str, price: f64) -> Stock {
    Stock::new(Symbol::parse(symbol).unwrap(), symbol, "technology", price, 1.0, 0.0).unwrap()
}

#[test]
fn test_snapshot_rejects_duplicate_symbols() {
    let snapshot = Snapshot {
        stocks: vec![stock("ABC", 10.0), stock("ABC", 12.0)],
        ..Default::default()
    };
    assert!(matches!(
        snapshot.validate(),
        Err(ValidationError::DuplicateSymbol(_))
    ));
}

#[test]
fn test_snapshot_rejects_duplicate_usernames() {
    let snapshot = Snapshot {
        accounts: vec![
            Account::open("ada", 100.0).unwrap(),
            Account::open("ada", 50.0).unwrap(),
        ],
        ..Default::default()
    };
    assert_eq!(
        snapshot.validate(),
        Err(ValidationError::DuplicateUsername("ada".into()))
    );
}

#[test]
fn test_upsert_replaces_in_place() {
    let mut snapshot = Snapshot::default();
    snapshot.upsert_stock(&stock("ABC", 10.0));
    snapshot.upsert_stock(&stock("XYZ", 5.0));
    snapshot.upsert_stock(&stock("ABC", 11.0));

    assert_eq!(snapshot.stocks.len(), 2);
    assert_eq!(snapshot.stocks[0].price(), 11.0);
}

#[test]
fn test_memory_store_applies_trade() {
    let store = MemoryStore::new();
    let mut account = Account::open("ada", 100.0).unwrap();
    let abc = stock("ABC", 10.0);
    store.persist_account(&account).unwrap();

    account.withdraw(20.0).unwrap();
    account.positions_mut().add(abc.symbol().clone(), 2).unwrap();
    let tx = Transaction::new(1, account.user_id(), abc.symbol().clone(), 2, 10.0, Side::Buy);
    store
        .persist_trade(&TradeCommit {
            account: &account,
            stock: &abc,
            transaction: &tx,
        })
        .unwrap();

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.accounts.len(), 1);
    assert_eq!(snapshot.account(account.user_id()).unwrap().balance(), 80.0);
    assert_eq!(snapshot.transactions, vec![tx]);
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("exchange.json");

    let account = Account::open("ada", 100.0).unwrap();
    {
        let store = FileStore::open(&path).unwrap();
        store.persist_stock(&stock("ABC", 10.0)).unwrap();
        store.persist_account(&account).unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    let snapshot = reopened.load().unwrap();
    assert_eq!(snapshot.stocks.len(), 1);
    assert_eq!(snapshot.account(account.user_id()), Some(&account));
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        FileStore::open(&path),
        Err(StoreError::Malformed(_))
    ));
}

fn buy(account: &mut Account, stock: &Stock, sequence: u64) -> Transaction {
    account.withdraw(stock.price()).unwrap();
    account.positions_mut().add(stock.symbol().clone(), 1).unwrap();
    Transaction::new(sequence, account.user_id(), stock.symbol().clone(), 1, stock.price(), Side::Buy)
}

#[test]
fn test_file_store_keeps_previous_state_when_write_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    let store = FileStore::open(&path).unwrap();
    // A directory in place of the records file makes the final rename fail.
    std::fs::create_dir(&path).unwrap();

    let err = store.persist_stock(&stock("ABC", 10.0)).unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(store.load().unwrap().stocks.is_empty());
}

#[test]
fn test_file_store_appends_transactions_to_journal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    let abc = stock("ABC", 10.0);
    let mut account = Account::open("ada", 100.0).unwrap();

    let store = FileStore::open(&path).unwrap();
    store.persist_account(&account).unwrap();
    let mut history = Vec::new();
    for sequence in 1..=3 {
        let tx = buy(&mut account, &abc, sequence);
        store
            .persist_trade(&TradeCommit {
                account: &account,
                stock: &abc,
                transaction: &tx,
            })
            .unwrap();
        history.push(tx);
    }

    let journal = std::fs::read_to_string(path.with_extension("journal.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 3);
    let records = std::fs::read_to_string(&path).unwrap();
    assert!(!records.contains("transactions"));

    let snapshot = FileStore::open(&path).unwrap().load().unwrap();
    assert_eq!(snapshot.transactions, history);
    assert_eq!(snapshot.account(account.user_id()).unwrap().balance(), 70.0);
}

#[test]
fn test_file_store_rolls_back_journal_when_records_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    let abc = stock("ABC", 10.0);
    let mut account = Account::open("ada", 100.0).unwrap();
    let store = FileStore::open(&path).unwrap();
    store.persist_account(&account).unwrap();

    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();
    let mut failed = account.clone();
    let lost = buy(&mut failed, &abc, 1);
    let err = store
        .persist_trade(&TradeCommit {
            account: &failed,
            stock: &abc,
            transaction: &lost,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(store.load().unwrap().transactions.is_empty());

    std::fs::remove_dir(&path).unwrap();
    let kept = buy(&mut account, &abc, 2);
    store
        .persist_trade(&TradeCommit {
            account: &account,
            stock: &abc,
            transaction: &kept,
        })
        .unwrap();

    let snapshot = FileStore::open(&path).unwrap().load().unwrap();
    assert_eq!(snapshot.transactions, vec![kept]);
    assert_eq!(snapshot.account(account.user_id()), Some(&account));
}

#[test]
fn test_file_store_drops_torn_journal_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    let abc = stock("ABC", 10.0);
    let mut account = Account::open("ada", 100.0).unwrap();
    let tx = buy(&mut account, &abc, 1);
    {
        let store = FileStore::open(&path).unwrap();
        store
            .persist_trade(&TradeCommit {
                account: &account,
                stock: &abc,
                transaction: &tx,
            })
            .unwrap();
    }

    let journal = path.with_extension("journal.jsonl");
    let mut file = std::fs::OpenOptions::new().append(true).open(&journal).unwrap();
    std::io::Write::write_all(&mut file, b"{\"id\":").unwrap();
    drop(file);

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.load().unwrap().transactions, vec![tx.clone()]);
    let next = buy(&mut account, &abc, 2);
    store
        .persist_trade(&TradeCommit {
            account: &account,
            stock: &abc,
            transaction: &next,
        })
        .unwrap();
    assert_eq!(store.load().unwrap().transactions, vec![tx, next]);
}

#[test]
fn test_file_store_rejects_corrupt_journal_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exchange.json");
    std::fs::write(path.with_extension("journal.jsonl"), "{ not json\n").unwrap();

    assert!(matches!(
        FileStore::open(&path),
        Err(StoreError::Malformed(_))
    ));
}
