//! One decoder per DBC keyword.
//!
//! Each decoder starts at its keyword token and consumes exactly one
//! statement from the [`Cursor`](super::cursor::Cursor).

pub(crate) mod ba_;
pub(crate) mod ba_def_;
pub(crate) mod ba_def_def_;
pub(crate) mod bo_;
pub(crate) mod bo_tx_bu_;
pub(crate) mod bs_;
pub(crate) mod bu_;
pub(crate) mod cm_;
pub(crate) mod message_layout;
pub(crate) mod ns_;
pub(crate) mod sg_;
pub(crate) mod sg_mul_val_;
pub(crate) mod sig_valtype_;
pub(crate) mod val_;
pub(crate) mod val_table_;
pub(crate) mod version;
