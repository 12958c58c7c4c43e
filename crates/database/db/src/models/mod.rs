/// This module contains the enqueue database model.
pub mod enqueue;

/// This module contains the ledger transaction database model.
pub mod ledger_transaction;

/// This module contains the metadata model.
pub mod metadata;

/// This module contains the queue index to transaction index mapping model.
pub mod queue_index;

/// This module contains the state root database model.
pub mod state_root;

/// This module contains the state root batch database model.
pub mod state_root_batch;

/// This module contains the transaction batch database model.
pub mod transaction_batch;
