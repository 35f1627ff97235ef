mod backend;
mod translation;
