use cqrs_application::dto::Dto;
use cqrs_application::markers::{Marked, Marker};
use cqrs_application::query::Query;
use cqrs_macros::Query;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct BalanceDto {
    amount: u64,
}

impl Dto for BalanceDto {}

#[derive(Debug, Serialize, Query)]
#[query(dto = BalanceDto, log)]
struct GetBalance {
    account: String,
}

fn main() {
    assert_eq!(GetBalance::NAME, "GetBalance");
    assert!(GetBalance::MARKERS.contains(Marker::Log));

    let _dto: <GetBalance as Query>::Dto = BalanceDto { amount: 0 };
    let _ = GetBalance { account: "a".into() }.account;
    let _ = BalanceDto { amount: 1 }.amount;
}
