//! Revocation registry definitions, their HCS entries, and the list fold.

mod rev_list;
mod rev_reg_def;
mod rev_reg_entry;

pub use rev_list::AnonCredsRevList;
pub use rev_reg_def::{
    AccumKey, AnonCredsRevRegDef, HcsMetadata, RevRegDefPublicKeys, RevRegDefValue,
    RevRegDefWithHcsMetadata, RevocationType,
};
pub use rev_reg_entry::{AnonCredsRevRegEntry, RevRegEntryValue, REV_REG_ENTRY_VERSION};
