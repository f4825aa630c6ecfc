//! Transaction coordination over the graph store.
//!
//! The store holds at most one open transaction. The coordinator owns the
//! store handle and a single mutex; a unit of work runs while that mutex
//! is held, so callers on other threads queue up behind it. The holder's
//! thread id is recorded next to the mutex.
//!
//! A nested unit of work, started either through [`Txn::run`] or by
//! calling the coordinator again from the same thread, finds the store
//! already in a transaction. It does not open a new one and leaves commit
//! and close to the opener.

use crate::error::{WapError, WapResult};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use wapsrv_storage::{GraphStore, TxnKind};

/// Serializes units of work against one graph store.
pub struct TransactionCoordinator {
    /// The shared store. Only the coordinator begins, commits or aborts.
    store: Arc<dyn GraphStore>,
    /// Held for the lifetime of each unit of work.
    lock: Mutex<()>,
    /// Thread holding `lock`, set only while it is held.
    owner: Mutex<Option<ThreadId>>,
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("transaction", &self.store.transaction_kind())
            .finish_non_exhaustive()
    }
}

impl TransactionCoordinator {
    /// Creates a coordinator for `store`.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            owner: Mutex::new(None),
        }
    }

    /// Runs `work` inside a transaction of `kind`.
    ///
    /// On `Ok` the transaction is committed (for writes) and closed. On
    /// `Err` it is aborted and the original error is returned unchanged.
    /// A panic inside `work` also aborts before the panic continues.
    ///
    /// Called from inside a unit of work on the same thread, `work` joins
    /// the open transaction, as with [`Txn::run`].
    ///
    /// # Errors
    ///
    /// Returns the error of `work`, or a storage error from begin/commit.
    pub fn run<T, F>(&self, kind: TxnKind, work: F) -> WapResult<T>
    where
        F: FnOnce(&Txn<'_>) -> WapResult<T>,
    {
        let txn = Txn {
            store: self.store.as_ref(),
        };
        if self.held_by_current_thread() {
            return txn.execute(kind, work);
        }
        let _held = Held::acquire(self);
        txn.execute(kind, work)
    }

    /// Runs `work` in a read transaction.
    ///
    /// # Errors
    ///
    /// See [`TransactionCoordinator::run`].
    pub fn read<T, F>(&self, work: F) -> WapResult<T>
    where
        F: FnOnce(&Txn<'_>) -> WapResult<T>,
    {
        self.run(TxnKind::Read, work)
    }

    /// Runs `work` in a write transaction.
    ///
    /// # Errors
    ///
    /// See [`TransactionCoordinator::run`].
    pub fn write<T, F>(&self, work: F) -> WapResult<T>
    where
        F: FnOnce(&Txn<'_>) -> WapResult<T>,
    {
        self.run(TxnKind::Write, work)
    }

    /// Returns true while a unit of work holds the store.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock.is_locked()
    }

    fn held_by_current_thread(&self) -> bool {
        *self.owner.lock() == Some(thread::current().id())
    }
}

/// The coordinator lock plus the owner record, cleared on drop so that a
/// panicking unit of work releases both.
struct Held<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> Held<'a> {
    fn acquire(coordinator: &'a TransactionCoordinator) -> Self {
        let guard = coordinator.lock.lock();
        *coordinator.owner.lock() = Some(thread::current().id());
        Self {
            owner: &coordinator.owner,
            _guard: guard,
        }
    }
}

impl Drop for Held<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
    }
}

/// Handle to the store inside a unit of work.
///
/// Components that operate on the store receive this handle and must not
/// keep it beyond the call.
#[derive(Clone, Copy)]
pub struct Txn<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> Txn<'a> {
    /// The store, for reads and writes inside the transaction.
    #[must_use]
    pub fn store(&self) -> &'a dyn GraphStore {
        self.store
    }

    /// Kind of the open transaction.
    #[must_use]
    pub fn kind(&self) -> Option<TxnKind> {
        self.store.transaction_kind()
    }

    /// Opens a transaction unless one is already open.
    ///
    /// Returns `true` if this call opened it and is therefore responsible
    /// for closing it, `false` for a re-entrant call.
    ///
    /// # Errors
    ///
    /// Returns `InternalServer` when a write is requested inside a read
    /// transaction, or a storage error if the store cannot begin.
    pub fn begin_transaction(&self, kind: TxnKind) -> WapResult<bool> {
        match self.store.transaction_kind() {
            None => {
                self.store.begin(kind)?;
                tracing::trace!(?kind, "transaction opened");
                Ok(true)
            }
            Some(TxnKind::Read) if kind == TxnKind::Write => Err(WapError::internal(
                "write transaction requested inside a read transaction",
            )),
            Some(_) => Ok(false),
        }
    }

    /// Commits and closes the transaction if `opened` is true; otherwise
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the commit fails. The transaction is
    /// then still open and must be aborted.
    pub fn end_transaction(&self, opened: bool) -> WapResult<()> {
        if !opened {
            return Ok(());
        }
        if self.store.is_in_transaction() {
            self.store.commit()?;
        }
        self.store.end();
        tracing::trace!("transaction closed");
        Ok(())
    }

    /// Aborts the open transaction. A no-op when none is open.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails to release it.
    pub fn abort(&self) -> WapResult<()> {
        if self.store.is_in_transaction() {
            self.store.abort()?;
            tracing::trace!("transaction aborted");
        }
        Ok(())
    }

    /// Runs nested work inside the current transaction, opening one only
    /// if none is open.
    ///
    /// An error from nested work aborts the whole transaction, including
    /// the opener's writes.
    ///
    /// # Errors
    ///
    /// Returns the error of `work`.
    pub fn run<T, F>(&self, kind: TxnKind, work: F) -> WapResult<T>
    where
        F: FnOnce(&Txn<'_>) -> WapResult<T>,
    {
        self.execute(kind, work)
    }

    fn execute<T, F>(&self, kind: TxnKind, work: F) -> WapResult<T>
    where
        F: FnOnce(&Txn<'_>) -> WapResult<T>,
    {
        let opened = self.begin_transaction(kind)?;
        let mut unwind = AbortOnUnwind {
            store: self.store,
            armed: opened,
        };
        let outcome = work(self);
        unwind.armed = false;

        match outcome {
            Ok(value) => {
                if let Err(err) = self.end_transaction(opened) {
                    let _ = self.abort();
                    return Err(err);
                }
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "aborting transaction");
                let _ = self.abort();
                Err(err)
            }
        }
    }
}

/// Aborts the opener's transaction when work panics.
struct AbortOnUnwind<'a> {
    store: &'a dyn GraphStore,
    armed: bool,
}

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.store.abort();
        }
    }
}
