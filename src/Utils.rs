/// CSV loaders for the raw dispensing records and the chemical inventory
pub mod load_from_file;
/// terminal and file logging set up with simplelog
pub mod logging;
