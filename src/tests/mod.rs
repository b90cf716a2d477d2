//! Binary-level tests: command line handling and end-to-end scenarios.
