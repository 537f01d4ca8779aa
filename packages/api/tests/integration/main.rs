mod admin;
mod auth;
mod harness;
mod team;
