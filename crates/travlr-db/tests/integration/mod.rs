mod catalog_tests;
mod common;
mod trip_tests;
mod user_audit_tests;
