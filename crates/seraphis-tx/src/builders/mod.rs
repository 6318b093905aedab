//! Transaction builders.
//!
//! Construction runs strictly forward:
//!
//! ```text
//! payment intents ──► output proposals ──► outputs + supplement
//! spend intents   ──► input proposals  ──► partial inputs ─┐
//!                                                          ├─► partial tx ──► tx
//!                          membership proofs (alignable) ──┘
//! ```
//!
//! Every step returns a new value or a `TxError`; nothing is patched up in
//! place after a failed check.

pub mod inputs;
pub mod legacy_inputs;
pub mod mixed;
pub mod outputs;

pub use inputs::{SpInputProposal, SpPartialInput};
pub use legacy_inputs::{LegacyInput, LegacyInputProposal};
pub use mixed::{SpPartialTx, TxProposal};
pub use outputs::{SpCoinbaseOutputProposal, SpOutputProposal};
