//! Command-level tests

mod test_download;
mod test_list_dialogs;
