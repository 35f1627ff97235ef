mod error;
mod gemini_tests;
mod ipc_tests;
