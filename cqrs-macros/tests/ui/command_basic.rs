use cqrs_application::command::Command;
use cqrs_application::markers::{Marked, Marker};
use cqrs_macros::Command;
use serde::Serialize;

#[derive(Debug, Serialize, Command)]
#[command(name = "bank.open_account", transactional, log)]
struct OpenAccount {
    owner: String,
}

#[derive(Debug, Serialize, Command)]
struct CloseAccount;

fn main() {
    assert_eq!(OpenAccount::NAME, "bank.open_account");
    assert!(OpenAccount::MARKERS.contains(Marker::Transactional));
    assert!(OpenAccount::MARKERS.contains(Marker::Log));
    assert!(!OpenAccount::MARKERS.contains(Marker::EventListener));

    assert_eq!(CloseAccount::NAME, "CloseAccount");
    assert!(CloseAccount::MARKERS.is_empty());

    let _ = OpenAccount { owner: "alice".into() }.owner;
}
