//! Unit test modules for the worker_platform component


mod fetch_test;
mod scope_test;
