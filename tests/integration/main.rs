mod common;
mod request_tests;
mod session_tests;
