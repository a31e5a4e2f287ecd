//! Reference-type constants and document sequence keys.
//!
//! Posting workflows identify the originating business document with an
//! opaque `(reference_type, reference_id[, reference_line_id])` tuple. The
//! constants below are the types this crate itself posts; callers are free
//! to pass their own for documents the core does not own.

/// Reference types recorded on ledger entries and inventory movements.
pub mod reference_type {
    pub const SALES_INVOICE: &str = "sales_invoice";
    pub const GOODS_RECEIPT: &str = "goods_receipt";
    pub const DEBIT_NOTE: &str = "debit_note";
}

/// Document sequence keys and the prefixes minted for them.
pub mod document_type {
    pub const SALES_INVOICE: &str = "INV";
    pub const GOODS_RECEIPT: &str = "GR";
    pub const PAYMENT: &str = "PAY";
    pub const CREDIT_NOTE: &str = "CN";
    pub const DEBIT_NOTE: &str = "DN";
}
