use cqrs_application::markers::{Marked, Marker};
use cqrs_domain::domain_event::DomainEvent;
use cqrs_macros::{DomainEvent, Marked};

#[derive(Debug, DomainEvent)]
#[event(event_type = "bank.account_opened")]
struct AccountOpened {
    owner: String,
}

#[derive(Debug, DomainEvent)]
struct AccountClosed;

#[derive(Debug, Marked)]
#[marked(event_listener)]
struct AccountFrozen;

fn main() {
    assert_eq!(AccountOpened::EVENT_TYPE, "bank.account_opened");
    assert_eq!(AccountClosed::EVENT_TYPE, "AccountClosed");
    assert!(AccountFrozen::MARKERS.contains(Marker::EventListener));

    let _ = AccountOpened { owner: "bob".into() }.owner;
}
