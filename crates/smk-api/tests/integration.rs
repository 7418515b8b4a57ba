mod common;

mod progress_tests;
mod ranking_tests;
