use super::{Snapshot, Store, TradeCommit};
use crate::sync;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use market::{Account, Stock, StoreError, Transaction};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store backed by two files side by side.
///
/// Stocks and accounts live in one JSON document at `path`, replaced
/// atomically on every write. Transactions are appended to a journal next to
/// it (`exchange.json` pairs with `exchange.journal.jsonl`), one JSON object
/// per line, and are never rewritten.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    journal_path: PathBuf,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    /// Current stocks and accounts; `transactions` stays empty.
    records: Snapshot,
    journal: File,
    /// Length of the journal up to its last committed entry.
    journal_len: u64,
}

/// On-disk shape of the records document.
#[derive(Default, Deserialize)]
struct Records {
    #[serde(default)]
    stocks: Vec<Stock>,
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Serialize)]
struct RecordsView<'a> {
    stocks: Vec<&'a Stock>,
    accounts: Vec<&'a Account>,
}

impl FileStore {
    /// Opens the store at `path`. Missing files start empty; unreadable or
    /// invalid ones are rejected. A torn last journal line is dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let journal_path = path.with_extension("journal.jsonl");

        let records = read_records(&path).map_err(malformed)?;
        let (transactions, journal_len) = read_journal(&journal_path).map_err(malformed)?;
        let snapshot = Snapshot {
            stocks: records.stocks,
            accounts: records.accounts,
            transactions,
        };
        snapshot.validate()?;
        info!(
            "Loaded {} stocks and {} accounts from {}, {} transactions from {}",
            snapshot.stocks.len(),
            snapshot.accounts.len(),
            path.display(),
            snapshot.transactions.len(),
            journal_path.display()
        );

        let journal = open_journal(&journal_path, journal_len).map_err(unavailable)?;
        Ok(Self {
            path,
            journal_path,
            state: Mutex::new(State {
                records: Snapshot {
                    transactions: Vec::new(),
                    ..snapshot
                },
                journal,
                journal_len,
            }),
        })
    }

    /// Appends `transaction` to the journal, then rewrites the records with
    /// `stock` and `account` in place. Memory only changes once both are on
    /// disk; a failed records write truncates the journal back.
    fn commit(
        &self,
        stock: Option<&Stock>,
        account: Option<&Account>,
        transaction: Option<&Transaction>,
    ) -> Result<(), StoreError> {
        let mut guard = sync::lock(&self.state);
        let state = &mut *guard;

        let mut journal_len = state.journal_len;
        if let Some(tx) = transaction {
            match append_entry(&mut state.journal, tx) {
                Ok(written) => journal_len += written,
                Err(e) => {
                    rewind(&state.journal, state.journal_len);
                    return Err(unavailable(e));
                }
            }
        }

        let view = RecordsView {
            stocks: overlay(&state.records.stocks, stock, |a, b| a.symbol() == b.symbol()),
            accounts: overlay(&state.records.accounts, account, |a, b| {
                a.user_id() == b.user_id()
            }),
        };
        if let Err(e) = replace_records(&self.path, &view) {
            rewind(&state.journal, state.journal_len);
            return Err(unavailable(e));
        }
        debug!("Records written to {}", self.path.display());

        if let Some(stock) = stock {
            state.records.upsert_stock(stock);
        }
        if let Some(account) = account {
            state.records.upsert_account(account);
        }
        state.journal_len = journal_len;
        Ok(())
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let state = sync::lock(&self.state);
        let (transactions, _) = read_journal(&self.journal_path).map_err(malformed)?;
        Ok(Snapshot {
            stocks: state.records.stocks.clone(),
            accounts: state.records.accounts.clone(),
            transactions,
        })
    }

    fn persist_stock(&self, stock: &Stock) -> Result<(), StoreError> {
        self.commit(Some(stock), None, None)
    }

    fn persist_account(&self, account: &Account) -> Result<(), StoreError> {
        self.commit(None, Some(account), None)
    }

    fn persist_trade(&self, commit: &TradeCommit<'_>) -> Result<(), StoreError> {
        self.commit(
            Some(commit.stock),
            Some(commit.account),
            Some(commit.transaction),
        )
    }
}

fn malformed(e: anyhow::Error) -> StoreError {
    StoreError::Malformed(format!("{e:#}"))
}

fn unavailable(e: anyhow::Error) -> StoreError {
    StoreError::Unavailable(format!("{e:#}"))
}

/// `items` with `staged` in place of its match, or appended when nothing matches.
fn overlay<'a, T>(
    items: &'a [T],
    staged: Option<&'a T>,
    same: impl Fn(&T, &T) -> bool,
) -> Vec<&'a T> {
    let Some(staged) = staged else {
        return items.iter().collect();
    };
    let mut found = false;
    let mut out: Vec<&T> = items
        .iter()
        .map(|item| {
            if same(item, staged) {
                found = true;
                staged
            } else {
                item
            }
        })
        .collect();
    if !found {
        out.push(staged);
    }
    out
}

fn read_records(path: &Path) -> Result<Records> {
    if !path.exists() {
        info!("No records at {}, starting empty", path.display());
        return Ok(Records::default());
    }
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Cannot decode records in {}", path.display()))
}

/// Stages the records next to `path`, syncs them, then renames over `path`.
fn replace_records(path: &Path, view: &RecordsView<'_>) -> Result<()> {
    let staging = path.with_extension("tmp");
    let file = File::create(&staging)
        .with_context(|| format!("Cannot create {}", staging.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, view).context("Cannot encode records")?;
    let file = writer.into_inner().context("Cannot flush records")?;
    file.sync_all().context("Cannot sync records")?;

    std::fs::rename(&staging, path)
        .with_context(|| format!("Cannot move records into {}", path.display()))
}

/// Reads every complete journal entry and the byte length they span.
fn read_journal(path: &Path) -> Result<(Vec<Transaction>, u64)> {
    if !path.exists() {
        return Ok((Vec::new(), 0));
    }
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut transactions = Vec::new();
    let mut committed = 0u64;
    let mut line = String::new();
    for number in 1.. {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        if read == 0 {
            break;
        }
        if !line.ends_with('\n') {
            warn!(
                "Dropping unterminated entry at line {number} of {}",
                path.display()
            );
            break;
        }
        if !line.trim().is_empty() {
            let tx = serde_json::from_str(line.trim_end())
                .with_context(|| format!("Bad entry at line {number} of {}", path.display()))?;
            transactions.push(tx);
        }
        committed += read as u64;
    }
    Ok((transactions, committed))
}

fn open_journal(path: &Path, committed: u64) -> Result<File> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
    }
    let journal = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    journal
        .set_len(committed)
        .with_context(|| format!("Cannot trim {}", path.display()))?;
    Ok(journal)
}

/// Appends one entry and syncs it. Returns the bytes written.
fn append_entry(journal: &mut File, tx: &Transaction) -> Result<u64> {
    let mut line = serde_json::to_vec(tx).context("Cannot encode transaction")?;
    line.push(b'\n');
    journal.write_all(&line).context("Cannot append to journal")?;
    journal.sync_data().context("Cannot sync journal")?;
    Ok(line.len() as u64)
}

fn rewind(journal: &File, committed: u64) {
    if let Err(e) = journal.set_len(committed) {
        error!("Cannot roll the journal back to {committed} bytes: {e}");
    }
}
