use cqrs_domain::error::{DomainError, DomainResult};
use cqrs_domain::value_object::ValueObject;
use cqrs_macros::value_object;

#[value_object]
struct Email {
    address: String,
}

#[value_object(debug = false)]
struct Opaque(u64);

#[value_object(validate = Self::check)]
#[derive(Copy, PartialOrd, Ord)]
struct Percent(u8);

impl Percent {
    fn check(&self) -> DomainResult<()> {
        if self.0 > 100 {
            return Err(DomainError::invalid_value("percent above 100"));
        }
        Ok(())
    }
}

#[value_object]
enum Tier {
    Free,
    Paid { seats: u32 },
}

fn main() {
    let _ = format!("{:?}", Email { address: "a@b.c".into() });
    let _ = Opaque(1).clone() == Opaque(1);

    let low = Percent(10).validated().unwrap();
    let copied = low;
    assert!(low <= copied);
    assert!(Percent(101).validate().is_err());

    assert_ne!(Tier::Free, Tier::Paid { seats: 2 });
}
